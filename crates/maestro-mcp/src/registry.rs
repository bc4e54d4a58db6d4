use std::collections::HashMap;

use crate::tool::ToolDescriptor;

/// Unified, insertion-ordered view of every discovered tool.
///
/// Built once after `connect_all` and read-only afterwards. Iteration
/// order is discovery order: servers in configuration order, each
/// server's tools in discovery order.
///
/// Collision policy is deterministic: when two servers expose the same
/// tool name, the later-processed server's descriptor replaces the
/// earlier one in place (position kept), and the shadowing is logged so
/// an operator can see which server won.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_tools(tools: Vec<ToolDescriptor>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.insert(tool);
        }
        registry
    }

    pub fn insert(&mut self, tool: ToolDescriptor) {
        if let Some(&pos) = self.index.get(&tool.name) {
            let shadowed = &self.tools[pos];
            tracing::warn!(
                tool = tool.name,
                winner = tool.server_id,
                shadowed = shadowed.server_id,
                "tool name collision: later server shadows earlier one"
            );
            self.tools[pos] = tool;
        } else {
            self.index.insert(tool.name.clone(), self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Exact-name lookup; no fuzzy matching.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&pos| &self.tools[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
