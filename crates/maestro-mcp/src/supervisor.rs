use std::time::Duration;

use tokio::sync::Mutex;

use crate::client::McpClient;
use crate::error::McpError;
use crate::tool::ToolDescriptor;

/// Launch specification for one MCP server, taken from configuration.
#[derive(Debug, Clone)]
pub struct ServerEntry {
    pub id: String,
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

/// Routes a tool call to the server that owns it.
///
/// The seam between the reasoning agent and the connection layer; the
/// agent only ever sees this trait, never a live connection.
pub trait ToolDispatch: Send + Sync {
    /// Invoke `tool_name` on `server_id` and return the joined textual
    /// content of the result.
    ///
    /// # Errors
    ///
    /// Returns `McpError::ServerNotFound` if the server is not connected,
    /// or the underlying call error.
    fn dispatch(
        &self,
        server_id: &str,
        tool_name: &str,
        args: serde_json::Value,
    ) -> impl Future<Output = Result<String, McpError>> + Send;
}

/// Ordered acquisition list. Releases happen by draining in reverse,
/// so release order is always the exact inverse of push order.
#[derive(Debug)]
struct ReleaseStack<T> {
    items: Vec<(String, T)>,
}

impl<T> ReleaseStack<T> {
    fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn push(&mut self, id: String, item: T) {
        self.items.push((id, item));
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.items
            .iter()
            .find_map(|(item_id, item)| (item_id == id).then_some(item))
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn ids(&self) -> Vec<String> {
        self.items.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Drain every item, last-acquired first. The stack is empty
    /// afterwards, so a second drain releases nothing.
    fn drain_reverse(&mut self) -> Vec<(String, T)> {
        let mut drained: Vec<(String, T)> = self.items.drain(..).collect();
        drained.reverse();
        drained
    }
}

/// Owns every live MCP connection for the lifetime of a run.
///
/// Connection attempts happen strictly in configuration order, one
/// fully completing before the next begins. A failed attempt is logged
/// and skipped; it never aborts later attempts or already-acquired
/// connections. [`Supervisor::shutdown_all`] must run on every exit
/// path and releases connections in reverse acquisition order.
pub struct Supervisor {
    entries: Vec<ServerEntry>,
    clients: Mutex<ReleaseStack<McpClient>>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("configured", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    #[must_use]
    pub fn new(entries: Vec<ServerEntry>) -> Self {
        Self {
            entries,
            clients: Mutex::new(ReleaseStack::new()),
        }
    }

    /// Connect to every configured server sequentially and return the
    /// accumulated tool list: servers in configuration order, each
    /// server's tools in discovery order.
    ///
    /// Launch, handshake, and discovery failures exclude only the
    /// offending server. A connection whose discovery fails is released
    /// immediately rather than kept half-loaded.
    pub async fn connect_all(&self) -> Vec<ToolDescriptor> {
        let mut all_tools = Vec::new();

        for entry in &self.entries {
            tracing::info!(server_id = entry.id, command = entry.command, "connecting to MCP server");

            let client =
                match McpClient::connect(&entry.id, &entry.command, &entry.args, entry.timeout)
                    .await
                {
                    Ok(client) => client,
                    Err(e) => {
                        tracing::warn!(server_id = entry.id, "skipping server: {e}");
                        continue;
                    }
                };

            match client.list_tools().await {
                Ok(tools) => {
                    tracing::info!(
                        server_id = entry.id,
                        tools = tools.len(),
                        "connected to MCP server"
                    );
                    all_tools.extend(tools);
                    self.clients.lock().await.push(entry.id.clone(), client);
                }
                Err(e) => {
                    tracing::warn!(server_id = entry.id, "skipping server: {e}");
                    client.shutdown().await;
                }
            }
        }

        all_tools
    }

    /// Number of connections currently held.
    pub async fn connected_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Ids of held connections, in acquisition order.
    pub async fn connected_ids(&self) -> Vec<String> {
        self.clients.lock().await.ids()
    }

    /// Release every held connection exactly once, in reverse
    /// acquisition order. Safe to call again; a second call finds
    /// nothing left to release.
    pub async fn shutdown_all(&self) {
        let drained = self.clients.lock().await.drain_reverse();
        for (id, client) in drained {
            tracing::info!(server_id = id, "shutting down MCP client");
            client.shutdown().await;
        }
    }
}

impl ToolDispatch for Supervisor {
    async fn dispatch(
        &self,
        server_id: &str,
        tool_name: &str,
        args: serde_json::Value,
    ) -> Result<String, McpError> {
        let clients = self.clients.lock().await;
        let client = clients.get(server_id).ok_or_else(|| McpError::ServerNotFound {
            server_id: server_id.into(),
        })?;
        let result = client.call_tool(tool_name, args).await?;

        let text = result
            .content
            .iter()
            .filter_map(|c| {
                if let rmcp::model::RawContent::Text(t) = &c.raw {
                    Some(t.text.as_str())
                } else {
                    tracing::debug!(
                        server_id,
                        tool_name,
                        "skipping non-text content from MCP tool"
                    );
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, command: &str) -> ServerEntry {
        ServerEntry {
            id: id.into(),
            command: command.into(),
            args: vec![],
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn release_stack_drains_in_reverse() {
        let mut stack = ReleaseStack::new();
        stack.push("a".into(), 1);
        stack.push("b".into(), 2);
        stack.push("c".into(), 3);

        let drained = stack.drain_reverse();
        let ids: Vec<&str> = drained.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn release_stack_release_count_matches_acquisitions() {
        let mut stack = ReleaseStack::new();
        for i in 0..7 {
            stack.push(format!("s{i}"), i);
        }
        assert_eq!(stack.drain_reverse().len(), 7);
        // second drain finds nothing: each item released exactly once
        assert!(stack.drain_reverse().is_empty());
    }

    #[test]
    fn release_stack_lookup_by_id() {
        let mut stack = ReleaseStack::new();
        stack.push("a".into(), 10);
        stack.push("b".into(), 20);
        assert_eq!(stack.get("b"), Some(&20));
        assert_eq!(stack.get("missing"), None);
    }

    #[tokio::test]
    async fn all_servers_failing_yields_empty_toolset() {
        let supervisor = Supervisor::new(vec![
            entry("bad-one", "/nonexistent/mcp-server"),
            entry("bad-two", "/also/nonexistent"),
        ]);
        let tools = supervisor.connect_all().await;
        assert!(tools.is_empty());
        assert_eq!(supervisor.connected_count().await, 0);
        supervisor.shutdown_all().await;
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_later_attempts() {
        // both fail, but the second attempt still runs: failures are
        // isolated per server, not aborted on first error
        let supervisor = Supervisor::new(vec![
            entry("first", "/nonexistent/one"),
            entry("second", "/nonexistent/two"),
        ]);
        let tools = supervisor.connect_all().await;
        assert!(tools.is_empty());
        assert!(supervisor.connected_ids().await.is_empty());
    }

    #[tokio::test]
    async fn dispatch_unknown_server_errors() {
        let supervisor = Supervisor::new(vec![]);
        let err = supervisor
            .dispatch("ghost", "anything", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::ServerNotFound { .. }));
    }

    #[tokio::test]
    async fn shutdown_all_is_idempotent() {
        let supervisor = Supervisor::new(vec![entry("bad", "/nonexistent")]);
        supervisor.connect_all().await;
        supervisor.shutdown_all().await;
        supervisor.shutdown_all().await;
        assert_eq!(supervisor.connected_count().await, 0);
    }
}
