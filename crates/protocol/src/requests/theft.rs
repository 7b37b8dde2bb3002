//! Theft and fence requests.

use serde::{Deserialize, Serialize};

use questwright_domain::value_objects::HeatLevel;
use questwright_domain::{CharacterId, DomainError, ItemId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StealRequest {
    pub thief_id: CharacterId,
    pub victim_id: CharacterId,
    pub item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub witnesses: Vec<CharacterId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub item_id: ItemId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCharacterRequest {
    pub character_id: CharacterId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeRequest {
    pub npc_id: CharacterId,
    pub item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub seller_id: CharacterId,
    pub fence_id: CharacterId,
    pub item_id: ItemId,
    /// Base value override; defaults to the item's stored value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_value: Option<i64>,
}

impl SellRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if matches!(self.item_value, Some(v) if v < 0) {
            return Err(DomainError::validation("itemValue cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFenceRequest {
    pub npc_id: CharacterId,
    pub buy_rate: f64,
    pub max_heat_level: HeatLevel,
    pub daily_heat_capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
}

impl RegisterFenceRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.1..=1.0).contains(&self.buy_rate) {
            return Err(DomainError::validation(
                "buyRate must be within 0.1..=1.0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTheftRequest {
    pub item_id: ItemId,
    #[serde(default)]
    pub bounty_offered: i64,
}

impl ReportTheftRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.bounty_offered < 0 {
            return Err(DomainError::validation("bountyOffered cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayRequest {
    pub days_advanced: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FenceRef {
    pub npc_id: CharacterId,
}

/// The consolidated theft tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TheftManageRequest {
    Steal(StealRequest),
    Check(ItemRef),
    Search(SearchCharacterRequest),
    Recognize(RecognizeRequest),
    Sell(SellRequest),
    RegisterFence(RegisterFenceRequest),
    Report(ReportTheftRequest),
    Decay(DecayRequest),
    GetFence(FenceRef),
    ListFences {},
}

impl TheftManageRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Sell(request) => request.validate(),
            Self::RegisterFence(request) => request.validate(),
            Self::Report(request) => request.validate(),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sell_parses_under_action_tag() {
        let request: TheftManageRequest = serde_json::from_value(json!({
            "action": "sell",
            "sellerId": CharacterId::new(),
            "fenceId": CharacterId::new(),
            "itemId": ItemId::new(),
            "itemValue": 100
        }))
        .unwrap();
        assert!(matches!(request, TheftManageRequest::Sell(_)));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_fence_rate_bounds() {
        let request: TheftManageRequest = serde_json::from_value(json!({
            "action": "register_fence",
            "npcId": CharacterId::new(),
            "buyRate": 1.5,
            "maxHeatLevel": "warm",
            "dailyHeatCapacity": 200
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_list_fences_takes_no_fields() {
        let request: TheftManageRequest =
            serde_json::from_value(json!({"action": "list_fences"})).unwrap();
        assert!(matches!(request, TheftManageRequest::ListFences {}));
    }
}
