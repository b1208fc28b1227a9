//! Errors surfaced to callers of the proxy client.

/// Client-side failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ClientErrorKind {
    /// Request could not be sent or the body could not be read
    #[display("Failed to call AI service: {}", _0)]
    Http(String),
    /// Proxy answered with a non-success status
    #[display("HTTP {}: {}", status, message)]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the body, or the reason phrase
        message: String,
    },
    /// Proxy answered 200 with an error-typed result
    #[display("{}", message)]
    Service {
        /// Error message
        message: String,
        /// Raw model output excerpt, when the proxy included one
        raw: Option<String>,
    },
    /// Body did not decode into a completion result
    #[display("Unexpected response body: {}", _0)]
    Decode(String),
    /// Stream ended with an error event
    #[display("Streaming error: {}", _0)]
    Stream(String),
}

/// Client error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Client Error: {} at line {} in {}", kind, line, file)]
pub struct ClientError {
    /// The kind of error that occurred
    pub kind: ClientErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ClientError {
    /// Create a new client error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ClientErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
