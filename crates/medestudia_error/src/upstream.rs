//! Errors talking to the upstream chat-completion API.

/// Maximum characters of upstream text carried in diagnostics.
pub const RAW_EXCERPT_CHARS: usize = 1000;

/// Upstream failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    /// No API key configured for the upstream service
    MissingApiKey,
    /// Upstream rejected the credential (HTTP 401)
    Unauthorized,
    /// Upstream answered with another non-success status
    Status {
        /// HTTP status code
        status_code: u16,
        /// Canonical reason phrase for the status
        reason: String,
        /// Truncated upstream body
        body: String,
    },
    /// Request never produced a response (DNS, connect, timeout, ...)
    Transport(String),
    /// Upstream body could not be decoded as a chat completion
    Decode(String),
    /// The completion carried no assistant text
    EmptyCompletion,
    /// Streaming body failed mid-flight
    StreamInterrupted(String),
}

impl std::fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamErrorKind::MissingApiKey => write!(
                f,
                "AI service not configured. Please set AZURE_FOUNDRY_API_KEY or DEEPSEEK_API_KEY environment variable."
            ),
            UpstreamErrorKind::Unauthorized => write!(
                f,
                "Invalid API key. Please check AZURE_FOUNDRY_API_KEY configuration."
            ),
            UpstreamErrorKind::Status { reason, .. } => write!(f, "AI service error: {}", reason),
            UpstreamErrorKind::Transport(msg) => write!(f, "{}", msg),
            UpstreamErrorKind::Decode(msg) => {
                write!(f, "Failed to decode AI service response: {}", msg)
            }
            UpstreamErrorKind::EmptyCompletion => write!(f, "Empty response from AI service"),
            UpstreamErrorKind::StreamInterrupted(msg) => write!(f, "Streaming error: {}", msg),
        }
    }
}

impl UpstreamErrorKind {
    /// Build a status error, keeping at most [`RAW_EXCERPT_CHARS`] of the body.
    pub fn status(status_code: u16, reason: impl Into<String>, body: &str) -> Self {
        UpstreamErrorKind::Status {
            status_code,
            reason: reason.into(),
            body: truncate_chars(body, RAW_EXCERPT_CHARS),
        }
    }

    /// Diagnostic excerpt of the upstream body, when one was captured.
    pub fn raw(&self) -> Option<&str> {
        match self {
            UpstreamErrorKind::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Upstream error with source location tracking.
///
/// # Examples
///
/// ```
/// use medestudia_error::{UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(UpstreamErrorKind::Unauthorized);
/// assert!(err.kind.to_string().starts_with("Invalid API key"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upstream Error: {} at line {} in {}", kind, line, file)]
pub struct UpstreamError {
    /// The kind of error that occurred
    pub kind: UpstreamErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UpstreamError {
    /// Create a new UpstreamError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: UpstreamErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Keep the first `max` characters of `text`.
///
/// Counts Unicode scalar values, so the cut never lands inside a character.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
