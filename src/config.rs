use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use maestro_mcp::ServerEntry;
use serde::Deserialize;

pub const CONFIG_ENV_VAR: &str = "MAESTRO_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.json";
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Top-level configuration document.
///
/// JSON, keyed like the conventional MCP client config:
/// `{"mcpServers": {"<name>": {"command": "...", "args": [...]}}}`.
/// Server order in the document is connection-attempt order, so the
/// map must preserve insertion order (serde_json `preserve_order`).
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_model() -> String {
    "mistral:7b".into()
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    command: String,
    #[serde(default)]
    args: Vec<String>,
}

impl Config {
    /// Load and validate configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid
    /// JSON, or defines no MCP servers. All of these are fatal — they
    /// halt the process before any connection attempt.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at '{}'", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file at '{}'", path.display()))?;

        if config.mcp_servers.is_empty() {
            bail!("no MCP servers found in the configuration");
        }

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MAESTRO_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("MAESTRO_LLM_MODEL") {
            self.llm.model = v;
        }
    }

    /// Convert the server map to supervisor entries, in document order.
    ///
    /// # Errors
    ///
    /// Returns an error if a server definition is malformed.
    pub fn server_entries(&self) -> anyhow::Result<Vec<ServerEntry>> {
        self.mcp_servers
            .iter()
            .map(|(name, value)| {
                let server: ServerConfig = serde_json::from_value(value.clone())
                    .with_context(|| format!("invalid definition for MCP server '{name}'"))?;
                Ok(ServerEntry {
                    id: name.clone(),
                    command: server.command,
                    args: server.args,
                    timeout: DEFAULT_TOOL_TIMEOUT,
                })
            })
            .collect()
    }
}

/// Resolve the config path: CLI flag, then `MAESTRO_CONFIG`, then
/// `config.json` next to the executable.
pub fn resolve_config_path(cli_override: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_override {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    tracing::warn!(
        "{CONFIG_ENV_VAR} not set, falling back to {}",
        fallback.display()
    );
    fallback
}
