//! MedEstudia completion proxy.
//!
//! Accepts `POST /api/ai` requests from the study web client, builds the
//! bilingual prompts, performs one upstream chat completion per request and
//! answers with a typed result or a relayed event stream.
//!
//! # Example
//!
//! ```no_run
//! use medestudia_server::{ApiState, ProxyConfig, create_router};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProxyConfig::from_env()?;
//! let listener = tokio::net::TcpListener::bind(config.bind().as_str()).await?;
//! let app = create_router(ApiState::new(config)?);
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod config;
mod metrics;
mod normalize;
mod relay;

pub use api::{ApiState, COMPLETION_PATH, create_router, no_stream_requested};
pub use config::{DEFAULT_BIND, DEFAULT_ENDPOINT, ProxyConfig, ProxyConfigBuilder};
pub use metrics::{
    MetricsSnapshot, Outcome, OutcomeSnapshot, ProxyMetrics, StreamEnd, StreamSnapshot, ToolCount,
};
pub use normalize::{NON_JSON_MESSAGE, chat_result, invalid_structure_message, normalize_structured};
pub use relay::{RELAY_BUFFER, sse_response};
