//! Error types for the MedEstudia completion proxy.
//!
//! Every error records the file and line it was created at, and the
//! aggregate [`MedestudiaError`] knows which HTTP status the proxy answers
//! with for it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod request;
mod upstream;

pub use client::{ClientError, ClientErrorKind};
pub use config::ConfigError;
pub use error::{MedestudiaError, MedestudiaErrorKind, MedestudiaResult};
pub use request::{RequestError, RequestErrorKind};
pub use upstream::{RAW_EXCERPT_CHARS, UpstreamError, UpstreamErrorKind, truncate_chars};
