//! Client input errors, rejected before any upstream call is made.

/// Ways an incoming completion request can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RequestErrorKind {
    /// Transport method other than POST
    #[display("Method not allowed")]
    MethodNotAllowed,
    /// Body is not a JSON object
    #[display("Invalid JSON body: {}", _0)]
    InvalidBody(String),
    /// One of tool, mode, language or input is absent or empty
    #[display("Missing required fields: tool, mode, language, input")]
    MissingFields,
    /// An enumerated field carries a literal we do not recognise
    #[display("Unknown {}: '{}'", field, value)]
    UnknownValue {
        /// Field name as it appears on the wire
        field: &'static str,
        /// Rejected value
        value: String,
    },
}

/// Request error with location tracking.
///
/// # Examples
///
/// ```
/// use medestudia_error::{RequestError, RequestErrorKind};
///
/// let err = RequestError::new(RequestErrorKind::MissingFields);
/// assert!(format!("{}", err.kind).contains("tool, mode, language, input"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Request Error: {} at line {} in {}", kind, line, file)]
pub struct RequestError {
    /// The kind of error that occurred
    pub kind: RequestErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RequestError {
    /// Create a new request error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RequestErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// HTTP status this rejection maps to.
    pub fn status_code(&self) -> u16 {
        match self.kind {
            RequestErrorKind::MethodNotAllowed => 405,
            _ => 400,
        }
    }
}
