//! Encounter repository port.

use async_trait::async_trait;

use questwright_domain::entities::Encounter;
use questwright_domain::EncounterId;

use super::RepositoryError;

#[async_trait]
pub trait EncounterRepositoryPort: Send + Sync {
    /// Insert or replace the encounter snapshot (tokens stored as a JSON
    /// blob that cascades with the row).
    async fn save(&self, encounter: &Encounter) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: EncounterId) -> Result<Option<Encounter>, RepositoryError>;
}
