//! Sampling parameters chosen per request.

use crate::{CompletionRequest, Tool};
use derive_getters::Getters;

/// Temperature for every tool except guidelines.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Lower temperature for more consistent guideline structure.
pub const GUIDELINES_TEMPERATURE: f32 = 0.3;

/// Token budget for a tool's completion.
pub fn token_limit(tool: Tool) -> u32 {
    match tool {
        Tool::Mcq => 800,
        Tool::Quiz => 1500,
        Tool::Explain => 1200,
        Tool::Chat => 1000,
        Tool::Guides => 1500,
    }
}

/// Parameters sent upstream alongside the prompts.
#[derive(Debug, Clone, Copy, PartialEq, Getters)]
pub struct GenerationParams {
    /// Sampling temperature
    temperature: f32,
    /// Maximum completion tokens
    max_tokens: u32,
    /// Ask upstream for a JSON object response
    json_mode: bool,
    /// Ask upstream for a server-sent event stream
    stream: bool,
}

impl GenerationParams {
    /// Resolves parameters for `request`.
    ///
    /// Streaming is used only for conversational chat, and only when the
    /// caller did not opt out. JSON mode is requested for structured tools
    /// whenever the call is buffered.
    pub fn resolve(request: &CompletionRequest, no_stream: bool) -> Self {
        let tool = *request.tool();
        let stream = request.is_conversational() && !no_stream;
        let temperature = if tool == Tool::Guides {
            GUIDELINES_TEMPERATURE
        } else {
            DEFAULT_TEMPERATURE
        };
        Self {
            temperature,
            max_tokens: token_limit(tool),
            json_mode: !stream && tool.is_structured(),
            stream,
        }
    }
}
