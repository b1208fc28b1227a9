//! Core data types for the MedEstudia completion proxy.
//!
//! This crate holds the request and result model shared by the proxy and its
//! client, the bilingual prompt builder, the per-tool generation parameters
//! and the AI status state machine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod observability;
mod params;
mod prompt;
mod request;
mod result;
mod status;
mod stream;
mod tool;

pub use observability::{init_observability, init_tracing, shutdown_observability};
pub use params::{DEFAULT_TEMPERATURE, GUIDELINES_TEMPERATURE, GenerationParams, token_limit};
pub use prompt::{
    PromptPair, build_prompts, build_system_prompt, educational_note, response_schema,
};
pub use request::{
    CompletionRequest, MAX_INPUT_CHARS, RawCompletionRequest, RawRequestContext, RequestContext,
    RequestContextBuilder,
};
pub use result::{
    ChatAnswer, CompletionResult, ErrorResult, Explanation, GuideStep, Guidelines, McqQuestion,
    OPTION_COUNT, Quiz, QuizItem, ShapeViolation,
};
pub use status::{AiStatus, StatusTracker};
pub use stream::{DONE_SENTINEL, StreamChunk, StreamEvent};
pub use tool::{Difficulty, Language, Mode, Tool};
