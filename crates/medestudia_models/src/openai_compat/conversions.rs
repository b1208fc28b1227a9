//! Type conversions between MedEstudia and OpenAI formats.

use crate::openai_compat::{ChatMessage, ChatRequest, ResponseFormat};
use medestudia_core::{GenerationParams, PromptPair};

/// Builds the two-message upstream request.
pub fn to_chat_request(
    prompts: &PromptPair,
    params: &GenerationParams,
    model: Option<&str>,
) -> ChatRequest {
    ChatRequest {
        model: model.map(str::to_string),
        messages: vec![
            ChatMessage::system(prompts.system().as_str()),
            ChatMessage::user(prompts.user().as_str()),
        ],
        max_tokens: Some(*params.max_tokens()),
        temperature: Some(*params.temperature()),
        response_format: params.json_mode().then(ResponseFormat::json_object),
        stream: params.stream().then_some(true),
    }
}
