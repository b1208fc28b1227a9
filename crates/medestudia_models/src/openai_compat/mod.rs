//! OpenAI-compatible chat-completion client.
//!
//! Azure AI Foundry deployments of DeepSeek speak this format with an
//! `api-key` header; any other compatible endpoint works the same way.

mod client;
mod conversions;
mod dto;

pub use client::{DeltaStream, UpstreamClient, UpstreamDelta, UpstreamSettings, UpstreamSettingsBuilder};
pub use conversions::to_chat_request;
pub use dto::{
    ChatChoice, ChatChunk, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse, ChoiceMessage,
    ChunkChoice, ChunkDelta, ResponseFormat,
};
