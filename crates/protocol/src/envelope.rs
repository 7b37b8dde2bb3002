//! Response envelope and the embedded state-block contract.
//!
//! Every mutating tool embeds a machine-readable JSON payload inside its
//! textual response, delimited so downstream parsers recover it without
//! re-parsing prose:
//!
//! ```text
//! The goblin takes 6 damage and falls.
//!
//! <!-- STATE_JSON
//! {"hit":true,"damage":6,"defeated":true}
//! STATE_JSON -->
//! ```

use serde::{Deserialize, Serialize};

const STATE_OPEN: &str = "<!-- STATE_JSON\n";
const STATE_CLOSE: &str = "\nSTATE_JSON -->";

/// One block of response content. Only text is produced today; the enum keeps
/// the wire shape open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// The envelope every tool handler returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ContentBlock>,
}

impl ToolResponse {
    /// Plain text response with no state block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Narrative text with an embedded state block.
    pub fn with_state<S: Serialize>(narrative: impl Into<String>, state: &S) -> Self {
        let state_json = serde_json::to_string(state)
            .unwrap_or_else(|_| "{\"error\":true,\"kind\":\"serialization\"}".to_string());
        let text = format!(
            "{}\n\n{STATE_OPEN}{state_json}{STATE_CLOSE}",
            narrative.into()
        );
        Self::text(text)
    }

    /// First text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().map(|block| {
            let ContentBlock::Text { text } = block;
            text.as_str()
        }).next()
    }

    /// Recover the embedded state block from this response.
    pub fn extract_state(&self) -> Option<serde_json::Value> {
        let text = self.first_text()?;
        let start = text.find(STATE_OPEN)? + STATE_OPEN.len();
        let end = text[start..].find(STATE_CLOSE)? + start;
        serde_json::from_str(&text[start..end]).ok()
    }
}

/// Machine-readable error payload embedded in failure envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Always true; lets parsers distinguish errors without a schema lookup
    pub error: bool,
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorPayload {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            kind: kind.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Format as a failure envelope: human sentence plus the embedded block.
    pub fn into_response(self) -> ToolResponse {
        let message = self.message.clone();
        ToolResponse::with_state(message, &self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_block_round_trip() {
        let response = ToolResponse::with_state("A hit!", &json!({"damage": 6, "hit": true}));
        let state = response.extract_state().unwrap();
        assert_eq!(state["damage"], 6);
        assert_eq!(state["hit"], true);
        assert!(response.first_text().unwrap().starts_with("A hit!"));
    }

    #[test]
    fn test_plain_text_has_no_state() {
        assert!(ToolResponse::text("hello").extract_state().is_none());
    }

    #[test]
    fn test_error_payload_embeds_kind() {
        let response = ErrorPayload::new("not_found", "Character not found: abc")
            .with_details(json!({"id": "abc"}))
            .into_response();
        let state = response.extract_state().unwrap();
        assert_eq!(state["error"], true);
        assert_eq!(state["kind"], "not_found");
        assert_eq!(state["details"]["id"], "abc");
    }

    #[test]
    fn test_envelope_wire_shape() {
        let json = serde_json::to_value(ToolResponse::text("hi")).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "hi");
    }
}
