pub mod error;
pub mod registry;
pub mod router;
pub mod services;
pub mod tools;

pub use error::ToolError;
pub use registry::{ToolDefinition, ToolRegistry};
