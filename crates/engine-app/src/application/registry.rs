//! Tool registry: advertises tools to the caller and routes invocations.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{json, Value};

use questwright_engine_ports::inbound::SessionContext;
use questwright_protocol::envelope::ToolResponse;

use super::error::ToolError;

type HandlerFuture = Pin<Box<dyn Future<Output = Result<ToolResponse, ToolError>> + Send>>;
type HandlerFn = Arc<dyn Fn(Value, SessionContext) -> HandlerFuture + Send + Sync>;

/// One registered tool: contract plus handler.
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    handler: HandlerFn,
}

impl ToolDefinition {
    pub fn new<F>(
        name: &'static str,
        description: &'static str,
        input_schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(Value, SessionContext) -> HandlerFuture + Send + Sync + 'static,
    {
        Self {
            name,
            description,
            input_schema,
            handler: Arc::new(handler),
        }
    }
}

/// Maps tool names to schema-validated handlers.
///
/// Registration happens once at composition time; invocation is the hot
/// path, one call at a time per session.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert keyed by name; re-registering fails.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), ToolError> {
        if self.tools.contains_key(definition.name) {
            return Err(ToolError::DuplicateTool(definition.name.to_string()));
        }
        self.tools.insert(definition.name, definition);
        Ok(())
    }

    /// Advertised contracts for caller introspection.
    pub fn list(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema,
                })
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Invoke a tool. Handler errors are formatted into the failure
    /// envelope here, so the transport always gets a well-formed response.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Value,
        session: SessionContext,
    ) -> Result<ToolResponse, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tracing::debug!(tool = %name, session = %session.session_id, "Invoking tool");
        match (tool.handler)(arguments, session).await {
            Ok(response) => Ok(response),
            Err(err) => {
                tracing::warn!(tool = %name, kind = err.kind(), error = %err, "Tool failed");
                Ok(err.into_response())
            }
        }
    }
}

/// Parse raw arguments into a typed request, mapping serde failures into
/// `ToolError::Validation` with the offending detail.
pub fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::Validation {
        message: format!("Arguments did not match the tool schema: {err}"),
        details: Some(json!({"parseError": err.to_string()})),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_tool(name: &'static str) -> ToolDefinition {
        ToolDefinition::new(name, "a test tool", json!({"type": "object"}), |_, _| {
            Box::pin(async { Ok(ToolResponse::text("ok")) })
        })
    }

    #[tokio::test]
    async fn test_register_and_invoke() {
        let mut registry = ToolRegistry::new();
        registry.register(noop_tool("ping")).unwrap();
        let response = registry
            .invoke("ping", json!({}), SessionContext::default())
            .await
            .unwrap();
        assert_eq!(response.first_text(), Some("ok"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(noop_tool("ping")).unwrap();
        let err = registry.register(noop_tool("ping")).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateTool(_)));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .invoke("nope", json!({}), SessionContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_envelope() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "fails",
                "always fails",
                json!({"type": "object"}),
                |_, _| Box::pin(async { Err(ToolError::Invariant("nope".into())) }),
            ))
            .unwrap();
        let response = registry
            .invoke("fails", json!({}), SessionContext::default())
            .await
            .unwrap();
        let state = response.extract_state().unwrap();
        assert_eq!(state["error"], true);
        assert_eq!(state["kind"], "invariant_violation");
    }

    #[test]
    fn test_list_exposes_schema() {
        let mut registry = ToolRegistry::new();
        registry.register(noop_tool("ping")).unwrap();
        let listed = registry.list();
        assert_eq!(listed[0]["name"], "ping");
        assert_eq!(listed[0]["inputSchema"]["type"], "object");
    }
}
