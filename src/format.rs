use std::fmt;

use serde::Serialize;

/// Encode a response value as pretty JSON, falling back to the `Debug`
/// rendering if serialization fails. The fallback cannot fail, so the
/// formatter always produces printable output.
pub fn render<T: Serialize + fmt::Debug>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("response not JSON-serializable, rendering as plain text: {e}");
            format!("{value:?}")
        }
    }
}
