//! Line framing for server-sent event streams.
//!
//! Bytes are split on `\n` before decoding, so a multi-byte character that
//! straddles two network reads is reassembled intact. A trailing partial
//! line stays buffered until the next read or [`SseLineBuffer::finish`].

/// Accumulates stream bytes and yields complete lines.
///
/// # Examples
///
/// ```
/// use medestudia_models::SseLineBuffer;
///
/// let mut buffer = SseLineBuffer::default();
/// assert!(buffer.push(b"data: {\"a\"").is_empty());
/// assert_eq!(buffer.push(b":1}\r\n\n"), vec!["data: {\"a\":1}".to_string(), String::new()]);
/// assert_eq!(buffer.finish(), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Appends `bytes` and drains every complete line, without terminators.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode_line(&line[..line.len() - 1]));
        }
        lines
    }

    /// Returns whatever partial line is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        let line = decode_line(&rest);
        (!line.trim().is_empty()).then_some(line)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Payload of a `data:` line, or `None` for comments, event names and blanks.
pub fn sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?;
    Some(data.strip_prefix(' ').unwrap_or(data))
}
