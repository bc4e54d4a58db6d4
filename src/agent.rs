use std::sync::Arc;

use maestro_llm::{LlmProvider, Message};
use maestro_mcp::{ToolDispatch, ToolRegistry, format_tools_prompt};

use crate::message::ResponseMessage;

/// The reasoning boundary the interactive loop talks to. `respond`
/// returns a finite, ordered message sequence for one query; it may
/// invoke tools any number of times before returning.
pub trait Agent: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the underlying provider fails; per-tool
    /// failures are reported inside the message sequence instead.
    fn respond(
        &self,
        query: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<ResponseMessage>>> + Send;
}

const SYSTEM_PREAMBLE: &str = "You are a tool-using assistant. When a tool is needed, \
emit an ```mcp``` fenced block with the invocation JSON shown below. \
Answer directly when no tool applies.";

/// Single-pass tool-use agent: ask the model, execute any requested
/// tool invocations, then ask once more with the tool output appended.
pub struct OrchestratorAgent<P, D> {
    provider: P,
    dispatcher: Arc<D>,
    system_prompt: String,
}

impl<P, D> OrchestratorAgent<P, D> {
    pub fn new(provider: P, dispatcher: Arc<D>, registry: &ToolRegistry) -> Self {
        let system_prompt = format!("{SYSTEM_PREAMBLE}\n\n{}", format_tools_prompt(registry));
        Self {
            provider,
            dispatcher,
            system_prompt,
        }
    }
}

impl<P: LlmProvider, D: ToolDispatch> Agent for OrchestratorAgent<P, D> {
    async fn respond(&self, query: &str) -> anyhow::Result<Vec<ResponseMessage>> {
        let mut out = vec![ResponseMessage::Human(query.to_owned())];
        let mut conversation = vec![
            Message::system(&self.system_prompt),
            Message::user(query),
        ];

        let reply = self.provider.chat(&conversation).await?;
        let blocks = extract_fenced_blocks(&reply, "mcp");
        out.push(ResponseMessage::Ai(reply.clone()));
        if blocks.is_empty() {
            return Ok(out);
        }

        let mut tool_outputs = Vec::new();
        for block in &blocks {
            match serde_json::from_str::<ToolInstruction>(block) {
                Ok(instr) => match self
                    .dispatcher
                    .dispatch(&instr.server, &instr.tool, instr.args)
                    .await
                {
                    Ok(text) => {
                        let labelled = format!("[{}:{}]\n{}", instr.server, instr.tool, text);
                        out.push(ResponseMessage::Tool(labelled.clone()));
                        tool_outputs.push(labelled);
                    }
                    Err(e) => {
                        tracing::warn!(
                            server = instr.server,
                            tool = instr.tool,
                            "tool call failed: {e}"
                        );
                        out.push(ResponseMessage::Other(format!("tool call failed: {e}")));
                    }
                },
                Err(e) => {
                    out.push(ResponseMessage::Other(format!(
                        "malformed tool instruction: {e}"
                    )));
                }
            }
        }

        if !tool_outputs.is_empty() {
            conversation.push(Message::assistant(&reply));
            conversation.push(Message::user(format!(
                "Tool results:\n{}",
                tool_outputs.join("\n\n")
            )));
            let final_reply = self.provider.chat(&conversation).await?;
            out.push(ResponseMessage::Ai(final_reply));
        }

        Ok(out)
    }
}

#[derive(serde::Deserialize)]
struct ToolInstruction {
    server: String,
    tool: String,
    #[serde(default = "default_args")]
    args: serde_json::Value,
}

fn default_args() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn extract_fenced_blocks<'a>(text: &'a str, lang: &str) -> Vec<&'a str> {
    let marker = format!("```{lang}");
    let marker_len = marker.len();
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(&marker) {
        let after = &rest[start + marker_len..];
        if let Some(end) = after.find("```") {
            blocks.push(after[..end].trim());
            rest = &after[end + 3..];
        } else {
            break;
        }
    }

    blocks
}
