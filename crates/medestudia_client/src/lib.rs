//! Typed client for the MedEstudia completion proxy.
//!
//! Each call reports its outcome to a caller-owned [`StatusTracker`], so the
//! AI status indicator follows the same transitions wherever it is shown.
//!
//! ```no_run
//! use medestudia_client::ProxyClient;
//! use medestudia_core::{AiStatus, CompletionRequest, Language, Mode, StatusTracker, Tool};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ProxyClient::new("http://localhost:3001")?;
//! let tracker = StatusTracker::new(AiStatus::Online);
//! let request = CompletionRequest::new(Tool::Mcq, Mode::Preclinical, Language::Es, "asma", None, 2000);
//! let result = client.complete(&request, &tracker).await?;
//! println!("{:?} ({})", result, tracker.current());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;

pub use client::{ChunkStream, ProxyClient};
