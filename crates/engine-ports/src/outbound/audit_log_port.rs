//! Append-only audit log port.

use async_trait::async_trait;

use questwright_domain::entities::AuditEntry;

use super::RepositoryError;

#[async_trait]
pub trait AuditLogPort: Send + Sync {
    /// Append an entry, returning its monotonically increasing id.
    async fn append(
        &self,
        action: &str,
        actor_id: Option<&str>,
        target_id: Option<&str>,
        details: serde_json::Value,
    ) -> Result<i64, RepositoryError>;

    /// Last `limit` entries, newest first.
    async fn tail(&self, limit: u32) -> Result<Vec<AuditEntry>, RepositoryError>;
}
