//! Crate-level error aggregation.

use crate::{ClientError, ConfigError, RequestError, UpstreamError};

/// Crate-level error variants.
#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum MedestudiaErrorKind {
    /// Rejected client input
    #[display("{}", _0)]
    Request(RequestError),
    /// Invalid or missing configuration
    #[display("{}", _0)]
    Config(ConfigError),
    /// Upstream model API failure
    #[display("{}", _0)]
    Upstream(UpstreamError),
    /// Proxy client failure
    #[display("{}", _0)]
    Client(ClientError),
}

/// MedEstudia error with kind discrimination.
#[derive(Debug)]
pub struct MedestudiaError(Box<MedestudiaErrorKind>);

impl MedestudiaError {
    /// Create a new error from a kind.
    pub fn new(kind: MedestudiaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MedestudiaErrorKind {
        &self.0
    }

    /// HTTP status the proxy answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            MedestudiaErrorKind::Request(e) => e.status_code(),
            MedestudiaErrorKind::Config(_)
            | MedestudiaErrorKind::Upstream(_)
            | MedestudiaErrorKind::Client(_) => 500,
        }
    }

    /// Message shown to the caller, without source location.
    pub fn public_message(&self) -> String {
        match self.kind() {
            MedestudiaErrorKind::Request(e) => e.kind.to_string(),
            MedestudiaErrorKind::Config(e) => e.message.clone(),
            MedestudiaErrorKind::Upstream(e) => e.kind.to_string(),
            MedestudiaErrorKind::Client(e) => e.kind.to_string(),
        }
    }

    /// Diagnostic excerpt of upstream output, if any.
    pub fn raw(&self) -> Option<&str> {
        match self.kind() {
            MedestudiaErrorKind::Upstream(e) => e.kind.raw(),
            MedestudiaErrorKind::Client(e) => match &e.kind {
                crate::ClientErrorKind::Service { raw, .. } => raw.as_deref(),
                _ => None,
            },
            _ => None,
        }
    }
}

impl std::fmt::Display for MedestudiaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MedEstudia Error: {}", self.0)
    }
}

impl std::error::Error for MedestudiaError {}

// Generic From implementation for any type that converts to MedestudiaErrorKind
impl<T> From<T> for MedestudiaError
where
    T: Into<MedestudiaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for MedEstudia operations.
pub type MedestudiaResult<T> = std::result::Result<T, MedestudiaError>;
