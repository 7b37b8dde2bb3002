//! Line-framed JSON-RPC over stdio, the default transport.
//!
//! One frame per line in, one frame per line out. Tool failures travel as
//! response envelopes; JSON-RPC errors are reserved for malformed frames and
//! unknown methods.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use questwright_engine_ports::inbound::SessionContext;
use questwright_protocol::rpc::{RpcRequest, RpcResponse, ToolCallParams};

use crate::composition::AppState;

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    tracing::info!("Serving JSON-RPC on stdio");
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(&state, &line).await;
        let mut framed = serde_json::to_string(&response)?;
        framed.push('\n');
        stdout.write_all(framed.as_bytes()).await?;
        stdout.flush().await?;
    }
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Requests within one session are handled to completion in arrival order;
/// this loop enforces that by never interleaving frames.
pub async fn handle_line(state: &AppState, line: &str) -> RpcResponse {
    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            return RpcResponse::error(None, -32700, format!("Parse error: {err}"));
        }
    };
    let id = request.id.clone();

    match request.method.as_str() {
        "tools/list" => RpcResponse::result(id, json!({"tools": state.registry.list()})),
        "tools/call" => {
            let params: ToolCallParams =
                match serde_json::from_value(request.params.unwrap_or(Value::Null)) {
                    Ok(params) => params,
                    Err(err) => {
                        return RpcResponse::error(id, -32602, format!("Invalid params: {err}"));
                    }
                };
            let session = params
                .session_id
                .map(SessionContext::new)
                .unwrap_or_default();
            match state
                .registry
                .invoke(&params.name, params.arguments, session)
                .await
            {
                Ok(envelope) => match serde_json::to_value(&envelope) {
                    Ok(result) => RpcResponse::result(id, result),
                    Err(err) => RpcResponse::error(id, -32603, format!("Internal error: {err}")),
                },
                // Only dispatch-level failures reach here (unknown tool)
                Err(err) => match serde_json::to_value(err.into_response()) {
                    Ok(result) => RpcResponse::result(id, result),
                    Err(err) => RpcResponse::error(id, -32603, format!("Internal error: {err}")),
                },
            }
        }
        other => RpcResponse::error(id, -32601, format!("Unknown method: {other}")),
    }
}
