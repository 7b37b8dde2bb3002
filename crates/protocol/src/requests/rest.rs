//! Rest requests.

use serde::{Deserialize, Serialize};

use questwright_domain::CharacterId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeLongRestRequest {
    pub character_id: CharacterId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeShortRestRequest {
    pub character_id: CharacterId,
    /// Hit dice to spend; negative values clamp to zero
    #[serde(default)]
    pub hit_dice: i32,
}

impl TakeShortRestRequest {
    pub fn dice_to_spend(&self) -> u32 {
        self.hit_dice.max(0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_hit_dice_clamp() {
        let request = TakeShortRestRequest {
            character_id: CharacterId::new(),
            hit_dice: -3,
        };
        assert_eq!(request.dice_to_spend(), 0);
    }
}
