use serde::{Deserialize, Serialize};

/// One message in an agent response, tagged by who produced it.
///
/// Serializes to `{"type": "<variant>", "content": "<content>"}` so the
/// loop can print responses as stable JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ResponseMessage {
    Human(String),
    Ai(String),
    Tool(String),
    Other(String),
}

impl ResponseMessage {
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Human(c) | Self::Ai(c) | Self::Tool(c) | Self::Other(c) => c,
        }
    }
}
