use std::fmt::Write;

use crate::registry::ToolRegistry;

/// Render the registry as an `<available_tools>` block for the system
/// prompt, including the fenced invocation syntax the agent extracts.
#[must_use]
pub fn format_tools_prompt(registry: &ToolRegistry) -> String {
    if registry.is_empty() {
        return String::new();
    }

    let mut out = String::from("<available_tools>\n");
    for tool in registry.iter() {
        let _ = writeln!(
            out,
            "  <tool server=\"{server}\" name=\"{name}\">\n\
             \x20   <description>{desc}</description>\n\
             \x20   <parameters>{schema}</parameters>\n\
             \x20   <invocation>\n\
             ```mcp\n\
             {{\"server\": \"{server}\", \"tool\": \"{name}\", \"args\": {{...}}}}\n\
             ```\n\
             \x20   </invocation>\n\
             \x20 </tool>",
            server = tool.server_id,
            name = tool.name,
            desc = tool.description,
            schema = tool.input_schema,
        );
    }
    out.push_str("</available_tools>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolDescriptor;

    fn registry_with(tools: Vec<(&str, &str, &str)>) -> ToolRegistry {
        ToolRegistry::from_tools(
            tools
                .into_iter()
                .map(|(server, name, desc)| ToolDescriptor {
                    server_id: server.into(),
                    name: name.into(),
                    description: desc.into(),
                    input_schema: serde_json::json!({"type": "object"}),
                })
                .collect(),
        )
    }

    #[test]
    fn empty_registry_returns_empty() {
        assert!(format_tools_prompt(&ToolRegistry::new()).is_empty());
    }

    #[test]
    fn single_tool_prompt() {
        let registry = registry_with(vec![("github", "create_issue", "Create issue")]);
        let prompt = format_tools_prompt(&registry);
        assert!(prompt.starts_with("<available_tools>"));
        assert!(prompt.ends_with("</available_tools>"));
        assert!(prompt.contains("server=\"github\""));
        assert!(prompt.contains("name=\"create_issue\""));
        assert!(prompt.contains("<description>Create issue</description>"));
        assert!(prompt.contains("```mcp"));
    }

    #[test]
    fn multiple_tools_in_registry_order() {
        let registry = registry_with(vec![
            ("github", "create_issue", "Create issue"),
            ("fs", "read_file", "Read a file"),
        ]);
        let prompt = format_tools_prompt(&registry);
        let first = prompt.find("create_issue").unwrap();
        let second = prompt.find("read_file").unwrap();
        assert!(first < second);
    }

    #[test]
    fn prompt_contains_parameters() {
        let registry = registry_with(vec![("s", "t", "d")]);
        let prompt = format_tools_prompt(&registry);
        assert!(prompt.contains("<parameters>"));
        assert!(prompt.contains("\"type\":\"object\""));
    }
}
