//! Events relayed to the browser while a chat answer streams in.

use serde::{Deserialize, Serialize};

/// Terminal sentinel carried in the final `data:` line.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A fragment of chat text, forwarded in arrival order and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Incremental text
    pub content: String,
}

#[derive(Serialize, Deserialize)]
struct StreamFailure {
    error: String,
}

/// One server-sent event of the downstream relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Token fragment
    Content(StreamChunk),
    /// The relay failed; no further events follow
    Error(String),
    /// Normal end of stream
    Done,
}

impl StreamEvent {
    /// Content event for a fragment.
    pub fn content(text: impl Into<String>) -> Self {
        StreamEvent::Content(StreamChunk {
            content: text.into(),
        })
    }

    /// Whether the stream ends after this event.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Content(_))
    }

    /// Encodes the event as a complete SSE frame (`data: ...\n\n`).
    pub fn to_sse_frame(&self) -> String {
        let data = match self {
            StreamEvent::Content(chunk) => json_line(chunk),
            StreamEvent::Error(message) => json_line(&StreamFailure {
                error: message.clone(),
            }),
            StreamEvent::Done => DONE_SENTINEL.to_string(),
        };
        format!("data: {}\n\n", data)
    }

    /// Decodes the payload of a downstream `data:` line.
    ///
    /// Returns `None` for payloads that are neither the sentinel nor one of
    /// the JSON shapes the relay emits.
    pub fn from_data(data: &str) -> Option<Self> {
        let data = data.trim();
        if data == DONE_SENTINEL {
            return Some(StreamEvent::Done);
        }
        if let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) {
            return Some(StreamEvent::Content(chunk));
        }
        serde_json::from_str::<StreamFailure>(data)
            .ok()
            .map(|f| StreamEvent::Error(f.error))
    }
}

fn json_line<T: Serialize>(value: &T) -> String {
    // Serializing a struct of strings cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| String::from("{}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames() {
        assert_eq!(
            StreamEvent::content("Hola \"mundo\"").to_sse_frame(),
            "data: {\"content\":\"Hola \\\"mundo\\\"\"}\n\n"
        );
        assert_eq!(StreamEvent::Done.to_sse_frame(), "data: [DONE]\n\n");
        assert_eq!(
            StreamEvent::Error("boom".into()).to_sse_frame(),
            "data: {\"error\":\"boom\"}\n\n"
        );
    }

    #[test]
    fn test_from_data_inverts_frames() {
        for event in [
            StreamEvent::content("línea\ncon salto"),
            StreamEvent::Error("upstream closed".into()),
            StreamEvent::Done,
        ] {
            let frame = event.to_sse_frame();
            let data = frame
                .strip_prefix("data: ")
                .and_then(|f| f.strip_suffix("\n\n"))
                .unwrap();
            assert_eq!(StreamEvent::from_data(data), Some(event));
        }
        assert_eq!(StreamEvent::from_data("{\"other\":1}"), None);
    }
}
