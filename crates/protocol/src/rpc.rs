//! JSON-RPC 2.0 framing for the tool-call transport.
//!
//! One frame per line on stdio; the same frames travel over the optional
//! WebSocket listener.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An incoming JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
    /// Session isolating this conversation's runtime caches
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

/// An outgoing JSON-RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn result(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC error object. Standard codes: -32700 parse error, -32600 invalid
/// request, -32601 method not found, -32602 invalid params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_parses_tool_call() {
        let frame = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "take_long_rest", "arguments": {"characterId": "abc"}}
        });
        let request: RpcRequest = serde_json::from_value(frame).unwrap();
        assert_eq!(request.method, "tools/call");
        let params: ToolCallParams = serde_json::from_value(request.params.unwrap()).unwrap();
        assert_eq!(params.name, "take_long_rest");
        assert_eq!(params.arguments["characterId"], "abc");
        assert!(params.session_id.is_none());
    }

    #[test]
    fn test_response_skips_empty_fields() {
        let response = RpcResponse::result(Some(json!(1)), json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("error").is_none());
        let response = RpcResponse::error(Some(json!(2)), -32601, "no such method");
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("result").is_none());
        assert_eq!(value["error"]["code"], -32601);
    }
}
