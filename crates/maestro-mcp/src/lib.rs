//! MCP connection lifecycle, tool discovery, and dispatch.

pub mod client;
pub mod error;
pub mod prompt;
pub mod registry;
pub mod supervisor;
pub mod tool;

pub use client::McpClient;
pub use error::McpError;
pub use prompt::format_tools_prompt;
pub use registry::ToolRegistry;
pub use supervisor::{ServerEntry, Supervisor, ToolDispatch};
pub use tool::ToolDescriptor;
