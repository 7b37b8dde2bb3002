//! Wire-visible error taxonomy for tool handling.
//!
//! Handlers recover nothing locally; every error surfaces here and the
//! registry formats it into a response envelope carrying both a human
//! sentence and a machine-readable `{error, kind, message, details}` block.

use serde_json::{json, Value};
use thiserror::Error;

use questwright_domain::DomainError;
use questwright_engine_ports::outbound::RepositoryError;
use questwright_protocol::envelope::{ErrorPayload, ToolResponse};

/// A fuzzy-match candidate offered on an unknown action.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSuggestion {
    pub value: String,
    pub similarity: f64,
}

#[derive(Debug, Error)]
pub enum ToolError {
    /// Input failed schema parsing. Caller fault; never retried.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    /// Registration collision
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// Dispatch target absent
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Consolidated-tool action absent; carries guidance for the caller
    #[error("Unknown action '{action}' for {tool}")]
    UnknownAction {
        tool: String,
        action: String,
        available_actions: Vec<String>,
        suggestions: Vec<ActionSuggestion>,
    },

    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Request would break a documented invariant. Not retriable.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Valid in isolation, forbidden by the current state
    #[error("Conflicting state: {0}")]
    Conflict(String),

    /// Underlying persistence failure, surfaced as-is
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Stable kind string embedded in the error payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::DuplicateTool(_) => "duplicate_tool",
            Self::UnknownTool(_) => "unknown_tool",
            Self::UnknownAction { .. } => "unknown_action",
            Self::NotFound { .. } => "not_found",
            Self::Invariant(_) => "invariant_violation",
            Self::Conflict(_) => "conflicting_state",
            Self::Storage(_) => "storage",
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let payload = ErrorPayload::new(self.kind(), self.to_string());
        match self {
            Self::Validation {
                details: Some(details),
                ..
            } => payload.with_details(details.clone()),
            Self::UnknownAction {
                available_actions,
                suggestions,
                ..
            } => payload.with_details(json!({
                "availableActions": available_actions,
                "suggestions": suggestions,
            })),
            Self::NotFound { entity_type, id } => {
                payload.with_details(json!({"entityType": entity_type, "id": id}))
            }
            _ => payload,
        }
    }

    /// Format into the failure envelope.
    pub fn into_response(self) -> ToolResponse {
        self.to_payload().into_response()
    }
}

impl From<DomainError> for ToolError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(message) | DomainError::Parse(message) => Self::Validation {
                message,
                details: None,
            },
            DomainError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            DomainError::Invariant(message) => Self::Invariant(message),
            DomainError::Conflict(message) => Self::Conflict(message),
        }
    }
}

impl From<RepositoryError> for ToolError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            RepositoryError::Constraint(message) => Self::Invariant(message),
            RepositoryError::Storage(message) | RepositoryError::Serialization(message) => {
                Self::Storage(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings_are_stable() {
        assert_eq!(ToolError::validation("x").kind(), "validation");
        assert_eq!(ToolError::UnknownTool("t".into()).kind(), "unknown_tool");
        assert_eq!(
            ToolError::Invariant("x".into()).kind(),
            "invariant_violation"
        );
    }

    #[test]
    fn test_unknown_action_payload_carries_guidance() {
        let err = ToolError::UnknownAction {
            tool: "theft_manage".into(),
            action: "xyz".into(),
            available_actions: vec!["steal".into(), "sell".into()],
            suggestions: vec![ActionSuggestion {
                value: "sell".into(),
                similarity: 0.67,
            }],
        };
        let payload = err.to_payload();
        let details = payload.details.unwrap();
        assert_eq!(details["availableActions"][0], "steal");
        assert_eq!(details["suggestions"][0]["value"], "sell");
    }

    #[test]
    fn test_domain_error_mapping() {
        let err: ToolError = DomainError::invariant("self-theft").into();
        assert!(matches!(err, ToolError::Invariant(_)));
        let err: ToolError = DomainError::not_found("Quest", "q1").into();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }
}
