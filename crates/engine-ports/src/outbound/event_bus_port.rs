//! Event bus port.
//!
//! Publication is fire-and-forget from the handler's perspective: failures
//! are logged, never propagated into the tool response. Subscribers observe
//! events in emission order and are isolated from each other.

use async_trait::async_trait;

use questwright_domain::entities::EventEntry;
use questwright_domain::DomainEvent;

use super::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait EventBusPort: Send + Sync {
    /// Publish to live subscribers and append to the persistent event log.
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError>;

    /// Last `limit` logged events, newest first, for observers that joined
    /// late.
    async fn tail(&self, limit: u32) -> Result<Vec<EventEntry>, RepositoryError>;
}
