//! Heat levels for stolen property.
//!
//! Heat is ordinal freshness: it starts at `Burning` when an item is stolen
//! and steps toward `Cold` as simulated days pass.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Ordinal freshness of a stolen item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLevel {
    Cold,
    Cool,
    Warm,
    Hot,
    Burning,
}

impl HeatLevel {
    /// Base recognition chance contributed by this heat level, in percent.
    pub fn recognition_value(self) -> u32 {
        match self {
            Self::Burning => 80,
            Self::Hot => 60,
            Self::Warm => 40,
            Self::Cool => 20,
            Self::Cold => 5,
        }
    }

    /// Fraction of the fence's buy rate retained at this heat. Hotter goods
    /// sell at a steeper discount.
    pub fn price_factor(self) -> f64 {
        match self {
            Self::Burning => 0.4,
            Self::Hot => 0.6,
            Self::Warm => 0.75,
            Self::Cool => 0.9,
            Self::Cold => 1.0,
        }
    }

    /// One decay step toward `Cold`. `Cold` stays `Cold`.
    pub fn cooled(self) -> Self {
        match self {
            Self::Burning => Self::Hot,
            Self::Hot => Self::Warm,
            Self::Warm => Self::Cool,
            Self::Cool | Self::Cold => Self::Cold,
        }
    }

    /// Apply `steps` decay steps.
    pub fn cooled_by(self, steps: u32) -> Self {
        (0..steps).fold(self, |level, _| level.cooled())
    }

    /// Detection risk band when a character carries goods at this heat.
    pub fn detection_risk(self) -> DetectionRisk {
        match self {
            Self::Burning => DetectionRisk::VeryHigh,
            Self::Hot => DetectionRisk::High,
            Self::Warm => DetectionRisk::Moderate,
            Self::Cool => DetectionRisk::Low,
            Self::Cold => DetectionRisk::None,
        }
    }
}

impl fmt::Display for HeatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Burning => "burning",
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Cold => "cold",
        };
        write!(f, "{s}")
    }
}

impl FromStr for HeatLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "burning" => Ok(Self::Burning),
            "hot" => Ok(Self::Hot),
            "warm" => Ok(Self::Warm),
            "cool" => Ok(Self::Cool),
            "cold" => Ok(Self::Cold),
            other => Err(DomainError::parse(format!("Unknown heat level: {other}"))),
        }
    }
}

/// Risk band reported when searching a character for stolen goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionRisk {
    None,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl fmt::Display for DetectionRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very high",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_monotonic() {
        assert!(HeatLevel::Burning > HeatLevel::Hot);
        assert!(HeatLevel::Hot > HeatLevel::Warm);
        assert!(HeatLevel::Warm > HeatLevel::Cool);
        assert!(HeatLevel::Cool > HeatLevel::Cold);
    }

    #[test]
    fn test_cooled_steps_toward_cold() {
        assert_eq!(HeatLevel::Burning.cooled(), HeatLevel::Hot);
        assert_eq!(HeatLevel::Burning.cooled_by(4), HeatLevel::Cold);
        assert_eq!(HeatLevel::Cold.cooled(), HeatLevel::Cold);
    }

    #[test]
    fn test_recognition_values_decrease_with_cooling() {
        let mut level = HeatLevel::Burning;
        let mut last = level.recognition_value();
        for _ in 0..4 {
            level = level.cooled();
            assert!(level.recognition_value() < last);
            last = level.recognition_value();
        }
    }

    #[test]
    fn test_price_factor_bounds() {
        assert!(HeatLevel::Burning.price_factor() <= 0.5);
        assert_eq!(HeatLevel::Cold.price_factor(), 1.0);
    }

    #[test]
    fn test_round_trip_strings() {
        for level in [
            HeatLevel::Burning,
            HeatLevel::Hot,
            HeatLevel::Warm,
            HeatLevel::Cool,
            HeatLevel::Cold,
        ] {
            assert_eq!(level.to_string().parse::<HeatLevel>().unwrap(), level);
        }
    }
}
