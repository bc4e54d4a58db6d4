use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use maestro_llm::OllamaProvider;
use maestro_mcp::{Supervisor, ToolRegistry};

mod agent;
mod config;
mod format;
mod message;
mod repl;

use agent::OrchestratorAgent;
use config::Config;

#[derive(Debug, Parser)]
#[command(name = "maestro", about = "Multi-server MCP client with an interactive agent loop")]
struct Args {
    /// Path to the JSON config file (overrides MAESTRO_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_subscriber();

    let config_path = config::resolve_config_path(args.config.as_deref());
    let config = Config::load(&config_path)?;
    let entries = config.server_entries()?;
    let provider = OllamaProvider::new(&config.llm.base_url, config.llm.model.clone());

    let supervisor = Arc::new(Supervisor::new(entries));
    let tools = supervisor.connect_all().await;

    // Everything after acquisition runs under this scope: whatever the
    // session outcome, connections are released before main returns,
    // in reverse acquisition order.
    let result = run_session(provider, Arc::clone(&supervisor), tools).await;
    supervisor.shutdown_all().await;
    result
}

async fn run_session(
    provider: OllamaProvider,
    supervisor: Arc<Supervisor>,
    tools: Vec<maestro_mcp::ToolDescriptor>,
) -> anyhow::Result<()> {
    if tools.is_empty() {
        bail!("no tools loaded from any configured server");
    }

    for tool in &tools {
        tracing::info!(server_id = tool.server_id, tool = tool.name, "loaded tool");
    }
    if let Err(e) = provider.health_check().await {
        tracing::warn!("LLM health check failed: {e}");
    }
    let registry = ToolRegistry::from_tools(tools);
    let agent = OrchestratorAgent::new(provider, supervisor, &registry);

    println!(
        "maestro ready: {} tool(s) from {} server(s). Type 'quit' to exit.",
        registry.len(),
        distinct_server_count(&registry)
    );
    repl::run(&agent).await
}

fn distinct_server_count(registry: &ToolRegistry) -> usize {
    let mut servers: Vec<&str> = registry.iter().map(|t| t.server_id.as_str()).collect();
    servers.sort_unstable();
    servers.dedup();
    servers.len()
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use maestro_mcp::ToolDescriptor;

    use super::*;

    fn tool(server: &str, name: &str) -> ToolDescriptor {
        ToolDescriptor {
            server_id: server.into(),
            name: name.into(),
            description: String::new(),
            input_schema: serde_json::json!({}),
        }
    }

    #[test]
    fn distinct_server_count_dedupes_servers() {
        let registry = ToolRegistry::from_tools(vec![
            tool("a", "one"),
            tool("a", "two"),
            tool("b", "three"),
        ]);
        assert_eq!(distinct_server_count(&registry), 2);
    }

    #[test]
    fn distinct_server_count_empty_registry() {
        assert_eq!(distinct_server_count(&ToolRegistry::new()), 0);
    }
}
