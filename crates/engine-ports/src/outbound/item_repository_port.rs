//! Item and inventory repository port.
//!
//! Inventory rows are keyed by `(character_id, item_id)`; the port can answer
//! "which characters hold item X" for world-unique-item enforcement.

use async_trait::async_trait;

use questwright_domain::entities::{InventoryEntry, Item};
use questwright_domain::{CharacterId, ItemId};

use super::RepositoryError;

#[async_trait]
pub trait ItemRepositoryPort: Send + Sync {
    async fn create(&self, item: &Item) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    async fn list(&self) -> Result<Vec<Item>, RepositoryError>;

    async fn inventory_of(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<InventoryEntry>, RepositoryError>;

    async fn entry(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
    ) -> Result<Option<InventoryEntry>, RepositoryError>;

    /// Every character currently holding the item.
    async fn holders_of(&self, item_id: ItemId) -> Result<Vec<CharacterId>, RepositoryError>;

    /// Insert the row or add to its quantity.
    async fn grant(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RepositoryError>;

    /// Flip the equipped flag. Equipping enforces one item per slot per
    /// character; unequipping clears the slot.
    async fn set_equipped(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
        equipped: bool,
        slot: Option<String>,
    ) -> Result<(), RepositoryError>;

    /// Atomic transfer: decrement-or-delete the source row and
    /// insert-or-increment the destination row in one transaction. Fails on
    /// insufficient quantity or an equipped source stack.
    async fn transfer(
        &self,
        from: CharacterId,
        to: CharacterId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RepositoryError>;
}
