//! SQLite audit log.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use chrono::Utc;

use questwright_domain::entities::AuditEntry;
use questwright_engine_ports::outbound::{AuditLogPort, RepositoryError};

use super::converters::{decode_timestamp, json_decode, map_sqlx};

pub struct SqliteAuditLog {
    pool: SqlitePool,
}

impl SqliteAuditLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<AuditEntry, RepositoryError> {
    Ok(AuditEntry {
        id: row.get("id"),
        action: row.get("action"),
        actor_id: row.get("actor_id"),
        target_id: row.get("target_id"),
        details: json_decode(row.get("details"))?,
        created_at: decode_timestamp(row.get("created_at"))?,
    })
}

#[async_trait]
impl AuditLogPort for SqliteAuditLog {
    async fn append(
        &self,
        action: &str,
        actor_id: Option<&str>,
        target_id: Option<&str>,
        details: serde_json::Value,
    ) -> Result<i64, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (action, actor_id, target_id, details, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(action)
        .bind(actor_id)
        .bind(target_id)
        .bind(details.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(result.last_insert_rowid())
    }

    async fn tail(&self, limit: u32) -> Result<Vec<AuditEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM audit_logs ORDER BY id DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_entry).collect()
    }
}
