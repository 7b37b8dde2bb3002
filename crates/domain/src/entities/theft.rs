//! Theft records and fences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CharacterId, ItemId};
use crate::value_objects::HeatLevel;

/// Provenance of a stolen item, keyed by the item id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheftRecord {
    pub item_id: ItemId,
    pub stolen_from: CharacterId,
    pub stolen_by: CharacterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stolen_location: Option<String>,
    pub witnesses: Vec<CharacterId>,
    pub heat_level: HeatLevel,
    pub reported_to_guards: bool,
    pub bounty: i64,
    pub created_at: DateTime<Utc>,
}

impl TheftRecord {
    pub fn new(
        item_id: ItemId,
        stolen_from: CharacterId,
        stolen_by: CharacterId,
        stolen_location: Option<String>,
        witnesses: Vec<CharacterId>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if stolen_from == stolen_by {
            return Err(DomainError::invariant(
                "A character cannot steal from itself",
            ));
        }
        Ok(Self {
            item_id,
            stolen_from,
            stolen_by,
            stolen_location,
            witnesses,
            heat_level: HeatLevel::Burning,
            reported_to_guards: false,
            bounty: 0,
            created_at: now,
        })
    }

    /// Recognition threshold in percent: heat value plus a tenth of the
    /// bounty, capped at 100.
    pub fn recognition_threshold(&self) -> u32 {
        (self.heat_level.recognition_value() + (self.bounty / 10).max(0) as u32).min(100)
    }
}

/// An NPC authorised to buy stolen goods under heat and capacity limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fence {
    pub npc_id: CharacterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    /// Fraction of base value paid, before the heat discount
    pub buy_rate: f64,
    pub max_heat_level: HeatLevel,
    pub daily_heat_capacity: u32,
    pub daily_heat_used: u32,
    pub specializations: Vec<String>,
    pub cooldown_days: u32,
}

impl Fence {
    pub fn new(
        npc_id: CharacterId,
        buy_rate: f64,
        max_heat_level: HeatLevel,
        daily_heat_capacity: u32,
    ) -> Result<Self, DomainError> {
        if !(0.1..=1.0).contains(&buy_rate) {
            return Err(DomainError::validation(format!(
                "Fence buy_rate must be within 0.1..=1.0, got {buy_rate}"
            )));
        }
        Ok(Self {
            npc_id,
            faction_id: None,
            buy_rate,
            max_heat_level,
            daily_heat_capacity,
            daily_heat_used: 0,
            specializations: Vec::new(),
            cooldown_days: 0,
        })
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.daily_heat_capacity.saturating_sub(self.daily_heat_used)
    }

    /// Why this fence refuses a record, or None if it accepts.
    pub fn refusal_reason(&self, record: &TheftRecord) -> Option<&'static str> {
        if record.heat_level > self.max_heat_level {
            return Some("The goods are too hot for this fence");
        }
        if self.remaining_capacity() < record.heat_level.recognition_value() {
            return Some("The fence has no remaining capacity today");
        }
        if self.cooldown_days > 0 {
            return Some("The fence is lying low for now");
        }
        None
    }

    /// Offered price for an item at the given base value.
    pub fn offer_price(&self, base_value: i64, heat: HeatLevel) -> i64 {
        ((base_value as f64) * self.buy_rate * heat.price_factor()).floor() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(heat: HeatLevel) -> TheftRecord {
        let mut record = TheftRecord::new(
            ItemId::new(),
            CharacterId::new(),
            CharacterId::new(),
            None,
            vec![],
            Utc::now(),
        )
        .unwrap();
        record.heat_level = heat;
        record
    }

    #[test]
    fn test_self_theft_rejected() {
        let id = CharacterId::new();
        let err = TheftRecord::new(ItemId::new(), id, id, None, vec![], Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Invariant(_)));
    }

    #[test]
    fn test_new_record_is_burning() {
        assert_eq!(record(HeatLevel::Burning).heat_level, HeatLevel::Burning);
    }

    #[test]
    fn test_recognition_threshold_caps_at_100() {
        let mut r = record(HeatLevel::Burning);
        r.bounty = 1000;
        assert_eq!(r.recognition_threshold(), 100);
        r.bounty = 100;
        assert_eq!(r.recognition_threshold(), 90);
    }

    #[test]
    fn test_fence_buy_rate_bounds() {
        assert!(Fence::new(CharacterId::new(), 0.05, HeatLevel::Warm, 100).is_err());
        assert!(Fence::new(CharacterId::new(), 1.2, HeatLevel::Warm, 100).is_err());
        assert!(Fence::new(CharacterId::new(), 0.5, HeatLevel::Warm, 100).is_ok());
    }

    #[test]
    fn test_fence_refuses_hot_goods() {
        let fence = Fence::new(CharacterId::new(), 0.5, HeatLevel::Warm, 500).unwrap();
        assert!(fence.refusal_reason(&record(HeatLevel::Burning)).is_some());
        assert!(fence.refusal_reason(&record(HeatLevel::Warm)).is_none());
    }

    #[test]
    fn test_fence_capacity_consumption() {
        let mut fence = Fence::new(CharacterId::new(), 0.5, HeatLevel::Burning, 100).unwrap();
        fence.daily_heat_used = 30;
        assert_eq!(fence.remaining_capacity(), 70);
        // burning heat value is 80 > 70 remaining
        assert!(fence.refusal_reason(&record(HeatLevel::Burning)).is_some());
    }

    #[test]
    fn test_offer_price_discounts_by_heat() {
        let fence = Fence::new(CharacterId::new(), 0.5, HeatLevel::Burning, 500).unwrap();
        let burning = fence.offer_price(100, HeatLevel::Burning);
        let cold = fence.offer_price(100, HeatLevel::Cold);
        assert_eq!(burning, 20);
        assert_eq!(cold, 50);
        assert!(burning < cold);
    }
}
