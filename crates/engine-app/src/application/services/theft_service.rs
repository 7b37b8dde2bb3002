//! Theft and fence engine: provenance records, heat decay, fence sales and
//! recognition rolls.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use questwright_domain::entities::{Fence, TheftRecord};
use questwright_domain::value_objects::{DetectionRisk, HeatLevel};
use questwright_domain::{CharacterId, DomainEvent, ItemId};
use questwright_engine_ports::outbound::{
    AuditLogPort, ClockPort, EventBusPort, ItemRepositoryPort, RandomPort, TheftRepositoryPort,
};
use questwright_protocol::requests::theft::{RegisterFenceRequest, StealRequest};

use crate::application::error::ToolError;

/// Engine configuration; one decay step per `decay_days_per_step` days.
#[derive(Debug, Clone)]
pub struct TheftConfig {
    pub decay_days_per_step: u32,
}

impl Default for TheftConfig {
    fn default() -> Self {
        Self {
            decay_days_per_step: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub character_id: CharacterId,
    pub stolen_items: Vec<TheftRecord>,
    pub detection_risk: DetectionRisk,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub npc_id: CharacterId,
    pub item_id: ItemId,
    pub recognized: bool,
    /// "hostile" for the victim, "suspicious" for a witness, "wary" on a
    /// successful roll
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<u32>,
    pub threshold: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResult {
    pub item_id: ItemId,
    pub fence_id: CharacterId,
    pub price: i64,
    pub heat_level: HeatLevel,
    pub capacity_remaining: u32,
}

pub struct TheftService {
    thefts: Arc<dyn TheftRepositoryPort>,
    items: Arc<dyn ItemRepositoryPort>,
    audit: Arc<dyn AuditLogPort>,
    events: Arc<dyn EventBusPort>,
    rng: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    config: TheftConfig,
}

impl TheftService {
    pub fn new(
        thefts: Arc<dyn TheftRepositoryPort>,
        items: Arc<dyn ItemRepositoryPort>,
        audit: Arc<dyn AuditLogPort>,
        events: Arc<dyn EventBusPort>,
        rng: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        config: TheftConfig,
    ) -> Self {
        Self {
            thefts,
            items,
            audit,
            events,
            rng,
            clock,
            config,
        }
    }

    fn publish_background(&self, event: DomainEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(err) = events.publish(event).await {
                tracing::warn!(error = %err, "Event publication failed");
            }
        });
    }

    /// Record a theft. The inventory move itself belongs to the inventory
    /// layer; this engine owns the provenance trail.
    pub async fn steal(&self, request: StealRequest) -> Result<TheftRecord, ToolError> {
        if self.thefts.find_record(request.item_id).await?.is_some() {
            return Err(ToolError::Conflict(format!(
                "Item {} already has an open theft record",
                request.item_id
            )));
        }
        let record = TheftRecord::new(
            request.item_id,
            request.victim_id,
            request.thief_id,
            request.location,
            request.witnesses,
            self.clock.now(),
        )?;
        self.thefts.create_record(&record).await?;

        self.audit
            .append(
                "theft.steal",
                Some(&request.thief_id.to_string()),
                Some(&request.item_id.to_string()),
                json!({
                    "victimId": record.stolen_from,
                    "witnesses": record.witnesses,
                    "heatLevel": record.heat_level,
                }),
            )
            .await?;
        self.publish_background(DomainEvent::TheftRecorded {
            item_id: record.item_id,
            thief_id: record.stolen_by,
            victim_id: record.stolen_from,
        });

        info!(item = %record.item_id, thief = %record.stolen_by, "Theft recorded");
        Ok(record)
    }

    pub async fn check(&self, item_id: ItemId) -> Result<Option<TheftRecord>, ToolError> {
        Ok(self.thefts.find_record(item_id).await?)
    }

    /// Stolen items currently held by the character, with a risk band from
    /// the hottest one.
    pub async fn search_character(
        &self,
        character_id: CharacterId,
    ) -> Result<SearchResult, ToolError> {
        let held: Vec<ItemId> = self
            .items
            .inventory_of(character_id)
            .await?
            .into_iter()
            .map(|entry| entry.item_id)
            .collect();

        let mut stolen_items = Vec::new();
        for item_id in held {
            if let Some(record) = self.thefts.find_record(item_id).await? {
                stolen_items.push(record);
            }
        }
        let detection_risk = stolen_items
            .iter()
            .map(|record| record.heat_level)
            .max()
            .map(HeatLevel::detection_risk)
            .unwrap_or(DetectionRisk::None);

        Ok(SearchResult {
            character_id,
            stolen_items,
            detection_risk,
        })
    }

    /// Does this NPC recognise the item as stolen? The victim always does,
    /// witnesses always do; everyone else rolls percentile against the
    /// record's threshold, ties favouring non-recognition.
    pub async fn recognize(
        &self,
        npc_id: CharacterId,
        item_id: ItemId,
        seed: Option<&str>,
    ) -> Result<RecognitionResult, ToolError> {
        let record =
            self.thefts
                .find_record(item_id)
                .await?
                .ok_or_else(|| ToolError::NotFound {
                    entity_type: "Theft record",
                    id: item_id.to_string(),
                })?;
        let threshold = record.recognition_threshold();

        if npc_id == record.stolen_from {
            return Ok(RecognitionResult {
                npc_id,
                item_id,
                recognized: true,
                reaction: Some("hostile".to_string()),
                roll: None,
                threshold,
            });
        }
        if record.witnesses.contains(&npc_id) {
            return Ok(RecognitionResult {
                npc_id,
                item_id,
                recognized: true,
                reaction: Some("suspicious".to_string()),
                roll: None,
                threshold,
            });
        }

        let roll = match seed {
            Some(seed) => self.rng.seeded(seed).roll_die(100) as u32,
            None => self.rng.percent(),
        };
        // Strictly below the threshold recognises; a roll equal to it does not
        let recognized = roll < threshold;
        debug!(npc = %npc_id, item = %item_id, roll, threshold, recognized, "Recognition roll");
        Ok(RecognitionResult {
            npc_id,
            item_id,
            recognized,
            reaction: recognized.then(|| "wary".to_string()),
            roll: Some(roll),
            threshold,
        })
    }

    /// Sell a stolen item to a fence, consuming daily capacity.
    pub async fn sell(
        &self,
        seller_id: CharacterId,
        fence_id: CharacterId,
        item_id: ItemId,
        item_value: Option<i64>,
    ) -> Result<SaleResult, ToolError> {
        let record =
            self.thefts
                .find_record(item_id)
                .await?
                .ok_or_else(|| ToolError::NotFound {
                    entity_type: "Theft record",
                    id: item_id.to_string(),
                })?;
        let mut fence =
            self.thefts
                .find_fence(fence_id)
                .await?
                .ok_or_else(|| ToolError::NotFound {
                    entity_type: "Fence",
                    id: fence_id.to_string(),
                })?;

        if let Some(reason) = fence.refusal_reason(&record) {
            return Err(ToolError::Conflict(reason.to_string()));
        }

        let base_value = match item_value {
            Some(value) => value,
            None => self
                .items
                .find_by_id(item_id)
                .await?
                .map(|item| item.value)
                .unwrap_or(0),
        };
        let price = fence.offer_price(base_value, record.heat_level);

        fence.daily_heat_used += record.heat_level.recognition_value();
        self.thefts.update_fence(&fence).await?;

        self.audit
            .append(
                "theft.sell",
                Some(&seller_id.to_string()),
                Some(&item_id.to_string()),
                json!({
                    "fenceId": fence_id,
                    "price": price,
                    "heatLevel": record.heat_level,
                    "baseValue": base_value,
                }),
            )
            .await?;
        self.publish_background(DomainEvent::StolenItemSold {
            item_id,
            fence_id,
            price,
        });

        Ok(SaleResult {
            item_id,
            fence_id,
            price,
            heat_level: record.heat_level,
            capacity_remaining: fence.remaining_capacity(),
        })
    }

    /// Register an NPC as a fence. A theft victim with an open record cannot
    /// become one.
    pub async fn register_fence(&self, request: RegisterFenceRequest) -> Result<Fence, ToolError> {
        let open_records = self.thefts.records_by_victim(request.npc_id).await?;
        if !open_records.is_empty() {
            return Err(ToolError::Invariant(format!(
                "NPC {} is the victim of {} open theft record(s) and cannot fence goods",
                request.npc_id,
                open_records.len()
            )));
        }
        if self.thefts.find_fence(request.npc_id).await?.is_some() {
            return Err(ToolError::Conflict(format!(
                "NPC {} is already a registered fence",
                request.npc_id
            )));
        }

        let mut fence = Fence::new(
            request.npc_id,
            request.buy_rate,
            request.max_heat_level,
            request.daily_heat_capacity,
        )?;
        fence.faction_id = request.faction_id;
        fence.specializations = request.specializations;
        self.thefts.create_fence(&fence).await?;

        self.audit
            .append(
                "theft.register_fence",
                None,
                Some(&fence.npc_id.to_string()),
                json!({"buyRate": fence.buy_rate, "maxHeatLevel": fence.max_heat_level}),
            )
            .await?;
        Ok(fence)
    }

    /// Report the theft to the guards, raising the bounty.
    pub async fn report(
        &self,
        item_id: ItemId,
        bounty_offered: i64,
    ) -> Result<TheftRecord, ToolError> {
        let mut record =
            self.thefts
                .find_record(item_id)
                .await?
                .ok_or_else(|| ToolError::NotFound {
                    entity_type: "Theft record",
                    id: item_id.to_string(),
                })?;
        record.reported_to_guards = true;
        record.bounty += bounty_offered;
        self.thefts.update_record(&record).await?;

        self.audit
            .append(
                "theft.report",
                None,
                Some(&item_id.to_string()),
                json!({"bounty": record.bounty}),
            )
            .await?;
        Ok(record)
    }

    /// Advance simulated days: heat cools one step per configured period and
    /// fence daily capacity resets.
    pub async fn decay(&self, days_advanced: u32) -> Result<usize, ToolError> {
        let steps = days_advanced / self.config.decay_days_per_step.max(1);
        let records_cooled = self.thefts.decay(steps).await?;

        self.audit
            .append(
                "theft.decay",
                None,
                None,
                json!({"daysAdvanced": days_advanced, "steps": steps, "recordsCooled": records_cooled}),
            )
            .await?;
        self.publish_background(DomainEvent::HeatDecayed {
            days_advanced,
            records_cooled,
        });
        Ok(records_cooled)
    }

    pub async fn get_fence(&self, npc_id: CharacterId) -> Result<Option<Fence>, ToolError> {
        Ok(self.thefts.find_fence(npc_id).await?)
    }

    pub async fn list_fences(&self) -> Result<Vec<Fence>, ToolError> {
        Ok(self.thefts.list_fences().await?)
    }
}
