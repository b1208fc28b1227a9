//! Completion requests as received from, and sent to, the proxy endpoint.

use crate::{Difficulty, Language, Mode, Tool};
use derive_getters::Getters;
use medestudia_error::{RequestError, RequestErrorKind, truncate_chars};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default cap on the free-text input, in characters.
pub const MAX_INPUT_CHARS: usize = 2000;

/// Optional study context attached to a request.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Getters,
    derive_builder::Builder,
)]
#[builder(setter(into, strip_option), default)]
pub struct RequestContext {
    /// Preclinical subject (e.g. "Fisiología")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    /// Clinical rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<String>,
    /// Organ system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Requested question difficulty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    difficulty: Option<Difficulty>,
    /// Explicit topic, overriding the free-text input in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    topic: Option<String>,
}

impl RequestContext {
    /// Returns a builder for constructing a RequestContext.
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }
}

/// A validated completion request.
///
/// The input has already been cut to the configured cap; nothing mutates a
/// request after construction.
///
/// # Examples
///
/// ```
/// use medestudia_core::{CompletionRequest, Language, Mode, Tool};
///
/// let long = "a".repeat(2500);
/// let req = CompletionRequest::new(Tool::Chat, Mode::Preclinical, Language::Es, long, None, 2000);
/// assert_eq!(req.input().chars().count(), 2000);
/// ```
///
/// Only serializable: the wire form is read through [`RawCompletionRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Getters)]
pub struct CompletionRequest {
    /// Requested tool
    tool: Tool,
    /// Pedagogical mode
    mode: Mode,
    /// Response language
    language: Language,
    /// Free-text question or topic
    input: String,
    /// Optional study context
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<RequestContext>,
}

impl CompletionRequest {
    /// Creates a request, truncating `input` to `max_input_chars` characters.
    pub fn new(
        tool: Tool,
        mode: Mode,
        language: Language,
        input: impl Into<String>,
        context: Option<RequestContext>,
        max_input_chars: usize,
    ) -> Self {
        let input = input.into();
        let input = if input.chars().count() > max_input_chars {
            truncate_chars(&input, max_input_chars)
        } else {
            input
        };
        Self {
            tool,
            mode,
            language,
            input,
            context,
        }
    }

    /// Topic interpolated into structured prompts: the context topic, else the input.
    pub fn topic(&self) -> &str {
        self.context
            .as_ref()
            .and_then(|c| non_empty(c.topic.as_deref()))
            .unwrap_or(&self.input)
    }

    /// First of subject, rotation, system that is present.
    pub fn subject_label(&self) -> Option<&str> {
        let ctx = self.context.as_ref()?;
        non_empty(ctx.subject.as_deref())
            .or_else(|| non_empty(ctx.rotation.as_deref()))
            .or_else(|| non_empty(ctx.system.as_deref()))
    }

    /// Requested difficulty, defaulting to medium.
    pub fn difficulty(&self) -> Difficulty {
        self.context
            .as_ref()
            .and_then(|c| c.difficulty)
            .unwrap_or_default()
    }

    /// True for chat outside guideline consultation, the only prose-only path.
    pub fn is_conversational(&self) -> bool {
        self.tool == Tool::Chat && self.mode != Mode::ClinicalGuidelines
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Request body exactly as it arrives on the wire, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompletionRequest {
    /// Tool literal
    #[serde(default)]
    pub tool: Option<String>,
    /// Mode literal
    #[serde(default)]
    pub mode: Option<String>,
    /// Language literal
    #[serde(default)]
    pub language: Option<String>,
    /// Free-text input
    #[serde(default)]
    pub input: Option<String>,
    /// Optional context
    #[serde(default)]
    pub context: Option<RawRequestContext>,
}

/// Context exactly as it arrives on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequestContext {
    /// Subject label
    #[serde(default)]
    pub subject: Option<String>,
    /// Rotation label
    #[serde(default)]
    pub rotation: Option<String>,
    /// System label
    #[serde(default)]
    pub system: Option<String>,
    /// Difficulty literal
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Topic
    #[serde(default)]
    pub topic: Option<String>,
}

impl RawCompletionRequest {
    /// Checks required fields and enum literals, then truncates the input.
    ///
    /// Missing or empty required fields are reported together; unknown
    /// literals are reported by field.
    #[tracing::instrument(skip(self), fields(tool = ?self.tool, mode = ?self.mode))]
    pub fn validate(self, max_input_chars: usize) -> Result<CompletionRequest, RequestError> {
        let (Some(tool), Some(mode), Some(language), Some(input)) = (
            present(self.tool),
            present(self.mode),
            present(self.language),
            present(self.input),
        ) else {
            return Err(RequestError::new(RequestErrorKind::MissingFields));
        };

        let tool = parse_literal::<Tool>("tool", tool)?;
        let mode = parse_literal::<Mode>("mode", mode)?;
        let language = parse_literal::<Language>("language", language)?;
        let context = self.context.map(RawRequestContext::validate).transpose()?;

        Ok(CompletionRequest::new(
            tool,
            mode,
            language,
            input,
            context,
            max_input_chars,
        ))
    }
}

impl RawRequestContext {
    fn validate(self) -> Result<RequestContext, RequestError> {
        let difficulty = present(self.difficulty)
            .map(|d| parse_literal::<Difficulty>("difficulty", d))
            .transpose()?;
        Ok(RequestContext {
            subject: present(self.subject),
            rotation: present(self.rotation),
            system: present(self.system),
            difficulty,
            topic: present(self.topic),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_literal<T: FromStr>(field: &'static str, value: String) -> Result<T, RequestError> {
    T::from_str(&value)
        .map_err(|_| RequestError::new(RequestErrorKind::UnknownValue { field, value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tool: &str, input: &str) -> RawCompletionRequest {
        RawCompletionRequest {
            tool: Some(tool.to_string()),
            mode: Some("preclinico".to_string()),
            language: Some("es".to_string()),
            input: Some(input.to_string()),
            context: None,
        }
    }

    #[test]
    fn test_truncation_is_exact_and_idempotent() {
        let long = "é".repeat(MAX_INPUT_CHARS + 321);
        let first = raw("chat", &long).validate(MAX_INPUT_CHARS).unwrap();
        assert_eq!(first.input().chars().count(), MAX_INPUT_CHARS);

        let again = raw("chat", first.input()).validate(MAX_INPUT_CHARS).unwrap();
        assert_eq!(again.input(), first.input());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut req = raw("chat", "hola");
        req.language = None;
        let err = req.validate(MAX_INPUT_CHARS).unwrap_err();
        assert_eq!(err.kind, RequestErrorKind::MissingFields);

        let err = raw("chat", "").validate(MAX_INPUT_CHARS).unwrap_err();
        assert_eq!(err.kind, RequestErrorKind::MissingFields);
    }

    #[test]
    fn test_unknown_literal_rejected() {
        let err = raw("essay", "hola").validate(MAX_INPUT_CHARS).unwrap_err();
        assert_eq!(
            err.kind,
            RequestErrorKind::UnknownValue {
                field: "tool",
                value: "essay".to_string()
            }
        );
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_context_labels_and_defaults() {
        let mut req = raw("mcq", "insuficiencia cardíaca");
        req.context = Some(RawRequestContext {
            subject: Some(String::new()),
            rotation: Some("Medicina Interna".to_string()),
            difficulty: Some("hard".to_string()),
            ..Default::default()
        });
        let req = req.validate(MAX_INPUT_CHARS).unwrap();
        assert_eq!(req.subject_label(), Some("Medicina Interna"));
        assert_eq!(req.difficulty(), Difficulty::Hard);
        assert_eq!(req.topic(), "insuficiencia cardíaca");

        let plain = raw("mcq", "asma").validate(MAX_INPUT_CHARS).unwrap();
        assert_eq!(plain.difficulty(), Difficulty::Medium);
        assert_eq!(plain.subject_label(), None);
    }

    #[test]
    fn test_context_topic_overrides_input() {
        let ctx = RequestContext::builder().topic("Asma").build().unwrap();
        let req = CompletionRequest::new(
            Tool::Explain,
            Mode::Preclinical,
            Language::En,
            "tell me about it",
            Some(ctx),
            MAX_INPUT_CHARS,
        );
        assert_eq!(req.topic(), "Asma");
    }

    #[test]
    fn test_wire_form_is_revalidated_with_cap() {
        let req = raw("quiz", "asma").validate(MAX_INPUT_CHARS).unwrap();
        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(wire["mode"], "preclinico");

        let back: RawCompletionRequest = serde_json::from_value(wire).unwrap();
        assert_eq!(back.validate(MAX_INPUT_CHARS).unwrap(), req);

        let oversized = serde_json::json!({
            "tool": "chat",
            "mode": "preclinico",
            "language": "es",
            "input": "x".repeat(MAX_INPUT_CHARS + 1),
        });
        let raw: RawCompletionRequest = serde_json::from_value(oversized).unwrap();
        let req = raw.validate(MAX_INPUT_CHARS).unwrap();
        assert_eq!(req.input().chars().count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        let mut req = raw("mcq", "asma");
        req.context = Some(RawRequestContext {
            difficulty: Some("brutal".to_string()),
            ..Default::default()
        });
        let err = req.validate(MAX_INPUT_CHARS).unwrap_err();
        assert!(matches!(
            err.kind,
            RequestErrorKind::UnknownValue {
                field: "difficulty",
                ..
            }
        ));
    }
}
