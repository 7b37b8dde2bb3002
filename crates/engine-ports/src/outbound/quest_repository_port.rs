//! Quest repository port.

use async_trait::async_trait;

use questwright_domain::entities::{Quest, QuestLog};
use questwright_domain::{CharacterId, QuestId, WorldId};

use super::RepositoryError;

#[async_trait]
pub trait QuestRepositoryPort: Send + Sync {
    async fn create(&self, quest: &Quest) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: QuestId) -> Result<Option<Quest>, RepositoryError>;

    async fn update(&self, quest: &Quest) -> Result<(), RepositoryError>;

    async fn list(&self, world_id: Option<WorldId>) -> Result<Vec<Quest>, RepositoryError>;

    /// The character's quest log, empty if none has been stored yet.
    async fn quest_log(&self, character_id: CharacterId) -> Result<QuestLog, RepositoryError>;

    async fn save_quest_log(&self, log: &QuestLog) -> Result<(), RepositoryError>;

    /// Completion transaction: persist the quest's completed state, the
    /// updated quest log, and grant the given reward items to the log's
    /// character, atomically.
    async fn complete_quest(
        &self,
        quest: &Quest,
        log: &QuestLog,
        grant_items: &[questwright_domain::ItemId],
    ) -> Result<(), RepositoryError>;
}
