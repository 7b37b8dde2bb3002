//! Custom effect and spellbook repository port.

use async_trait::async_trait;

use questwright_domain::entities::{CustomEffect, EffectCategory, SynthesizedSpell};
use questwright_domain::{CharacterId, EffectId};

use super::RepositoryError;

/// Filters for effect queries; `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct EffectQuery {
    pub category: Option<EffectCategory>,
    pub source_type: Option<String>,
    pub active_only: bool,
}

#[async_trait]
pub trait EffectRepositoryPort: Send + Sync {
    async fn insert(&self, effect: &CustomEffect) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: EffectId) -> Result<Option<CustomEffect>, RepositoryError>;

    async fn find_by_target_and_name(
        &self,
        target_id: &str,
        name: &str,
    ) -> Result<Option<CustomEffect>, RepositoryError>;

    async fn list_by_target(
        &self,
        target_id: &str,
        query: &EffectQuery,
    ) -> Result<Vec<CustomEffect>, RepositoryError>;

    async fn update(&self, effect: &CustomEffect) -> Result<(), RepositoryError>;

    async fn remove(&self, id: EffectId) -> Result<(), RepositoryError>;

    /// Delete rows flagged inactive, returning how many were swept.
    async fn sweep_inactive(&self, target_id: &str) -> Result<usize, RepositoryError>;

    async fn insert_spell(&self, spell: &SynthesizedSpell) -> Result<(), RepositoryError>;

    async fn spellbook(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<SynthesizedSpell>, RepositoryError>;
}
