use std::borrow::Cow;
use std::time::Duration;

use rmcp::ServiceExt;
use rmcp::model::{CallToolRequestParams, CallToolResult};
use rmcp::service::RunningService;
use rmcp::transport::TokioChildProcess;
use tokio::process::Command;

use crate::error::McpError;
use crate::tool::ToolDescriptor;

type ClientService = RunningService<rmcp::RoleClient, ()>;

/// One stdio MCP session: a spawned child process plus the running
/// protocol service on its stdin/stdout.
///
/// Owned exclusively by the [`Supervisor`](crate::supervisor::Supervisor);
/// no retries are performed here — a failed connect is final for this run.
pub struct McpClient {
    server_id: String,
    service: ClientService,
    timeout: Duration,
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("server_id", &self.server_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl McpClient {
    /// Spawn the child process and perform the MCP initialize handshake.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Launch` if the process cannot be spawned and
    /// `McpError::Handshake` if the initialize exchange fails.
    pub async fn connect(
        server_id: &str,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<Self, McpError> {
        let mut cmd = Command::new(command);
        cmd.args(args);

        let transport = TokioChildProcess::new(cmd).map_err(|e| McpError::Launch {
            server_id: server_id.into(),
            message: e.to_string(),
        })?;

        let service = ().serve(transport).await.map_err(|e| McpError::Handshake {
            server_id: server_id.into(),
            message: e.to_string(),
        })?;

        Ok(Self {
            server_id: server_id.into(),
            service,
            timeout,
        })
    }

    #[must_use]
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// Call tools/list and convert the result to [`ToolDescriptor`]s.
    ///
    /// An empty list is not an error — a server may legitimately expose
    /// zero tools.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Discovery` if the listing call fails.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| McpError::Discovery {
                server_id: self.server_id.clone(),
                message: e.to_string(),
            })?;

        Ok(tools
            .into_iter()
            .map(|t| ToolDescriptor {
                server_id: self.server_id.clone(),
                name: t.name.to_string(),
                description: t.description.map_or_else(String::new, |d| d.to_string()),
                input_schema: serde_json::to_value(&*t.input_schema).unwrap_or_default(),
            })
            .collect())
    }

    /// Call tools/call with JSON args, return the raw result.
    ///
    /// # Errors
    ///
    /// Returns `McpError::Timeout` or `McpError::ToolCall` on failure.
    pub async fn call_tool(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<CallToolResult, McpError> {
        let arguments: Option<serde_json::Map<String, serde_json::Value>> = args
            .as_object()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect());

        let params = CallToolRequestParams {
            name: Cow::Owned(name.to_owned()),
            arguments,
            task: None,
            meta: None,
        };

        let result = tokio::time::timeout(self.timeout, self.service.call_tool(params))
            .await
            .map_err(|_| McpError::Timeout {
                server_id: self.server_id.clone(),
                tool_name: name.into(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| McpError::ToolCall {
                server_id: self.server_id.clone(),
                tool_name: name.into(),
                message: e.to_string(),
            })?;

        Ok(result)
    }

    /// Cancel the running service and reap the child process.
    pub async fn shutdown(self) {
        let _ = self.service.cancel().await;
    }
}
