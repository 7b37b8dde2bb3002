//! Event bus: in-process broadcast plus the persistent event log.
//!
//! Each subscriber gets its own broadcast receiver, so observers are
//! isolated and see events in emission order. Publication failures never
//! propagate into tool handling.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::broadcast;

use questwright_domain::entities::EventEntry;
use questwright_domain::DomainEvent;
use questwright_engine_ports::outbound::{EventBusError, EventBusPort, RepositoryError};

use crate::infrastructure::persistence::converters::{decode_timestamp, json_decode};

const CHANNEL_CAPACITY: usize = 256;

pub struct InProcessEventBus {
    pool: SqlitePool,
    sender: broadcast::Sender<DomainEvent>,
}

impl InProcessEventBus {
    pub fn new(pool: SqlitePool) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { pool, sender }
    }

    /// A live feed of events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventBusPort for InProcessEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError> {
        let payload = serde_json::to_string(&event)
            .map_err(|err| EventBusError::Transport(err.to_string()))?;
        sqlx::query("INSERT INTO event_logs (event_type, payload, created_at) VALUES (?, ?, ?)")
            .bind(event.event_type())
            .bind(&payload)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|err| EventBusError::Transport(err.to_string()))?;

        // No receivers is fine; the log already has it
        let _ = self.sender.send(event);
        Ok(())
    }

    async fn tail(&self, limit: u32) -> Result<Vec<EventEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM event_logs ORDER BY id DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;
        rows.iter()
            .map(|row| {
                Ok(EventEntry {
                    id: row.get("id"),
                    event_type: row.get("event_type"),
                    payload: json_decode(row.get("payload"))?,
                    created_at: decode_timestamp(row.get("created_at"))?,
                })
            })
            .collect()
    }
}
