//! Character repository port.

use async_trait::async_trait;

use questwright_domain::entities::Character;
use questwright_domain::CharacterId;

use super::RepositoryError;

#[async_trait]
pub trait CharacterRepositoryPort: Send + Sync {
    async fn create(&self, character: &Character) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: CharacterId) -> Result<Option<Character>, RepositoryError>;

    /// Full-row update; fails with `NotFound` if the character is missing.
    async fn update(&self, character: &Character) -> Result<(), RepositoryError>;

    /// Deleting a character cascades its inventory rows and quest log.
    async fn delete(&self, id: CharacterId) -> Result<(), RepositoryError>;

    async fn list(&self) -> Result<Vec<Character>, RepositoryError>;

    /// Write final combat hp into several characters in one transaction.
    /// Ids with no matching row are skipped, mirroring ad-hoc tokens.
    async fn write_back_hp(
        &self,
        updates: &[(CharacterId, i32)],
    ) -> Result<Vec<CharacterId>, RepositoryError>;
}
