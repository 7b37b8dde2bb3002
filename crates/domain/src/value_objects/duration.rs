//! Durations for custom effects.

use serde::{Deserialize, Serialize};

/// Unit an effect duration is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationKind {
    Rounds,
    Minutes,
    Hours,
    Days,
    Permanent,
    UntilRemoved,
}

impl DurationKind {
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            Self::Rounds | Self::Minutes | Self::Hours | Self::Days
        )
    }
}

/// How long a custom effect lasts.
///
/// `value` is required for the timed kinds and ignored for `Permanent` and
/// `UntilRemoved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectDuration {
    #[serde(rename = "type")]
    pub kind: DurationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

impl EffectDuration {
    pub fn rounds(value: u32) -> Self {
        Self {
            kind: DurationKind::Rounds,
            value: Some(value),
        }
    }

    pub fn permanent() -> Self {
        Self {
            kind: DurationKind::Permanent,
            value: None,
        }
    }

    /// Remaining rounds, if this is a round-based duration.
    pub fn remaining_rounds(&self) -> Option<u32> {
        match self.kind {
            DurationKind::Rounds => self.value,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_kinds() {
        assert!(DurationKind::Rounds.is_timed());
        assert!(!DurationKind::Permanent.is_timed());
        assert!(!DurationKind::UntilRemoved.is_timed());
    }

    #[test]
    fn test_serde_shape() {
        let duration = EffectDuration::rounds(3);
        let json = serde_json::to_value(&duration).unwrap();
        assert_eq!(json["type"], "rounds");
        assert_eq!(json["value"], 3);
    }
}
