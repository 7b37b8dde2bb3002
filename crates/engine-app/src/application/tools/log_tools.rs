//! Audit and event log introspection.

use std::sync::Arc;

use serde::Deserialize;

use questwright_engine_ports::outbound::{AuditLogPort, EventBusPort};
use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TailRequest {
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    20
}

pub fn register(
    registry: &mut ToolRegistry,
    audit: Arc<dyn AuditLogPort>,
    events: Arc<dyn EventBusPort>,
) -> Result<(), ToolError> {
    registry.register(ToolDefinition::new(
        "get_audit_log",
        "The most recent audited mutations, newest first.",
        schema::object(&[("limit", schema::integer("How many entries, default 20"))], &[]),
        move |args, _session| {
            let audit = audit.clone();
            Box::pin(async move {
                let request: TailRequest = parse_args(args)?;
                let entries = audit.tail(request.limit).await?;
                Ok(ToolResponse::with_state(
                    format!("{} audit entr(ies).", entries.len()),
                    &entries,
                ))
            })
        },
    ))?;

    registry.register(ToolDefinition::new(
        "get_event_log",
        "The most recent published events, newest first.",
        schema::object(&[("limit", schema::integer("How many events, default 20"))], &[]),
        move |args, _session| {
            let events = events.clone();
            Box::pin(async move {
                let request: TailRequest = parse_args(args)?;
                let entries = events.tail(request.limit).await?;
                Ok(ToolResponse::with_state(
                    format!("{} event(s).", entries.len()),
                    &entries,
                ))
            })
        },
    ))?;

    Ok(())
}
