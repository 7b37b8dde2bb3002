//! Theft record and fence repository port.

use async_trait::async_trait;

use questwright_domain::entities::{Fence, TheftRecord};
use questwright_domain::{CharacterId, ItemId};

use super::RepositoryError;

#[async_trait]
pub trait TheftRepositoryPort: Send + Sync {
    async fn create_record(&self, record: &TheftRecord) -> Result<(), RepositoryError>;

    async fn find_record(&self, item_id: ItemId) -> Result<Option<TheftRecord>, RepositoryError>;

    async fn update_record(&self, record: &TheftRecord) -> Result<(), RepositoryError>;

    /// Open records where the character is the victim. Non-empty means the
    /// character cannot be registered as a fence.
    async fn records_by_victim(
        &self,
        victim_id: CharacterId,
    ) -> Result<Vec<TheftRecord>, RepositoryError>;

    async fn create_fence(&self, fence: &Fence) -> Result<(), RepositoryError>;

    async fn find_fence(&self, npc_id: CharacterId) -> Result<Option<Fence>, RepositoryError>;

    async fn update_fence(&self, fence: &Fence) -> Result<(), RepositoryError>;

    async fn list_fences(&self) -> Result<Vec<Fence>, RepositoryError>;

    /// Decay transaction: cool every record by the given number of steps and
    /// reset per-fence daily capacity. Returns how many records cooled.
    async fn decay(&self, steps: u32) -> Result<usize, RepositoryError>;
}
