//! Wire contract between the engine and its LLM orchestrator.
//!
//! Tool invocations arrive as `{name, arguments}`; responses are envelopes of
//! text content with a machine-readable state block embedded in the text.

pub mod envelope;
pub mod requests;
pub mod rpc;
pub mod schema;

pub use envelope::{ContentBlock, ErrorPayload, ToolResponse};
pub use rpc::{RpcError, RpcRequest, RpcResponse, ToolCallParams};
