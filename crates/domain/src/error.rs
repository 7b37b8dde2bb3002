//! Unified error type for domain operations.
//!
//! Adapters and services map these onto the wire-visible error taxonomy
//! without resorting to String or anyhow.

use thiserror::Error;

use crate::value_objects::DiceParseError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone)]
pub enum DomainError {
    /// Input failed validation (e.g. field values out of bounds)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Request would break a documented invariant
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Operation valid in isolation but forbidden by the current state
    #[error("Conflicting state: {0}")]
    Conflict(String),

    /// Parse error (value objects, id strings)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an invariant-violation error.
    ///
    /// Use this when a request would break a documented invariant:
    /// self-theft, registering a theft victim as a fence, transferring an
    /// equipped item, assigning a quest with unmet prerequisites.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        Self::Parse(format!("Invalid id: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DomainError::not_found("Character", "abc");
        assert_eq!(err.to_string(), "Character not found: abc");
    }

    #[test]
    fn test_invariant_display() {
        let err = DomainError::invariant("a character cannot steal from itself");
        assert!(matches!(err, DomainError::Invariant(_)));
        assert!(err.to_string().starts_with("Invariant violation"));
    }

    #[test]
    fn test_from_dice_parse_error() {
        let err: DomainError = DiceParseError::Empty.into();
        assert!(matches!(err, DomainError::Parse(_)));
    }
}
