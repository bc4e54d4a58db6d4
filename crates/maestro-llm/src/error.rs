#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("empty response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("{0}")]
    Other(String),
}
