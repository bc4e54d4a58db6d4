use serde::{Deserialize, Serialize};

/// One capability discovered from a connected server.
///
/// `name` is the tool name exactly as the server reported it; the
/// registry keys on it, so two servers exposing the same name collide
/// (later server wins). `server_id` records the origin connection the
/// call must be routed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub server_id: String,
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tool(server: &str, name: &str) -> ToolDescriptor {
        ToolDescriptor {
            server_id: server.into(),
            name: name.into(),
            description: "test tool".into(),
            input_schema: serde_json::json!({"type": "object"}),
        }
    }

    #[test]
    fn tool_roundtrip_json() {
        let tool = make_tool("fs", "read_file");
        let json = serde_json::to_string(&tool).unwrap();
        let parsed: ToolDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.server_id, "fs");
        assert_eq!(parsed.name, "read_file");
        assert_eq!(parsed.description, "test tool");
    }

    #[test]
    fn tool_clone_preserves_origin() {
        let tool = make_tool("github", "create_issue");
        let cloned = tool.clone();
        assert_eq!(cloned.server_id, "github");
        assert_eq!(cloned.name, "create_issue");
    }
}
