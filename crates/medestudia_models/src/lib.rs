//! Upstream model integration for the MedEstudia proxy.
//!
//! [`UpstreamClient`] performs exactly one HTTP call per completion, either
//! buffered or streamed. [`SseLineBuffer`] is the line framing shared with
//! the proxy client, which reads the relay's own event stream.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod openai_compat;
mod sse;

pub use openai_compat::*;
pub use sse::{SseLineBuffer, sse_data};
