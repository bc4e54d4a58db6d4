#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("failed to launch server '{server_id}': {message}")]
    Launch { server_id: String, message: String },

    #[error("handshake failed for server '{server_id}': {message}")]
    Handshake { server_id: String, message: String },

    #[error("tool discovery failed for server '{server_id}': {message}")]
    Discovery { server_id: String, message: String },

    #[error("tool call failed: {server_id}/{tool_name}: {message}")]
    ToolCall {
        server_id: String,
        tool_name: String,
        message: String,
    },

    #[error("tool call timed out after {timeout_secs}s: {server_id}/{tool_name}")]
    Timeout {
        server_id: String,
        tool_name: String,
        timeout_secs: u64,
    },

    #[error("server '{server_id}' is not connected")]
    ServerNotFound { server_id: String },
}
