//! Completion results, one variant per tool plus the error variant.

use crate::{Difficulty, Tool};
use medestudia_error::{RAW_EXCERPT_CHARS, truncate_chars};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of answer options every multiple-choice question carries.
pub const OPTION_COUNT: usize = 4;

/// Result returned to the caller, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompletionResult {
    /// Conversational answer
    Chat(ChatAnswer),
    /// Single multiple-choice question
    Mcq(McqQuestion),
    /// List of multiple-choice questions
    Quiz(Quiz),
    /// Structured topic explanation
    Explain(Explanation),
    /// Step-by-step guideline
    Guides(Guidelines),
    /// Anything that went wrong, with an optional raw excerpt
    Error(ErrorResult),
}

impl CompletionResult {
    /// Tool this result answers, or `None` for the error variant.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            CompletionResult::Chat(_) => Some(Tool::Chat),
            CompletionResult::Mcq(_) => Some(Tool::Mcq),
            CompletionResult::Quiz(_) => Some(Tool::Quiz),
            CompletionResult::Explain(_) => Some(Tool::Explain),
            CompletionResult::Guides(_) => Some(Tool::Guides),
            CompletionResult::Error(_) => None,
        }
    }

    /// Builds the error variant, cutting `raw` to the diagnostic excerpt size.
    pub fn error(message: impl Into<String>, raw: Option<&str>) -> Self {
        CompletionResult::Error(ErrorResult {
            error: message.into(),
            raw: raw.map(|r| truncate_chars(r, RAW_EXCERPT_CHARS)),
        })
    }

    /// True for the error variant.
    pub fn is_error(&self) -> bool {
        matches!(self, CompletionResult::Error(_))
    }

    /// Checks the per-tool shape invariants.
    pub fn check_shape(&self) -> Result<(), ShapeViolation> {
        match self {
            CompletionResult::Chat(chat) => require_text("answer", &chat.answer),
            CompletionResult::Mcq(mcq) => mcq.check_shape(),
            CompletionResult::Quiz(quiz) => {
                if quiz.questions.is_empty() {
                    return Err(ShapeViolation::Empty("questions"));
                }
                quiz.questions.iter().try_for_each(QuizItem::check_shape)
            }
            CompletionResult::Explain(explain) => require_text("definition", &explain.definition),
            CompletionResult::Guides(guides) => require_text("sourceNote", &guides.source_note),
            CompletionResult::Error(_) => Ok(()),
        }
    }
}

/// Why a decoded result does not satisfy its tool's shape.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ShapeViolation {
    /// A required text field is empty
    #[display("field '{}' is empty", _0)]
    Empty(&'static str),
    /// Wrong number of options
    #[display("expected 4 options, found {}", _0)]
    OptionCount(usize),
    /// Correct index outside the option list
    #[display("correctIndex {} is out of range", _0)]
    CorrectIndex(usize),
}

/// Conversational answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnswer {
    /// Answer text
    pub answer: String,
    /// Educational disclaimer, clinical-study mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    /// Question stem
    pub question: String,
    /// Exactly four options
    pub options: Vec<String>,
    /// Index of the correct option
    pub correct_index: usize,
    /// Why the correct option is correct
    pub explanation: String,
    /// Difficulty; filled from the request when the model omits it
    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Option<Difficulty>,
}

impl McqQuestion {
    fn check_shape(&self) -> Result<(), ShapeViolation> {
        require_text("question", &self.question)?;
        check_options(&self.options, self.correct_index)?;
        require_text("explanation", &self.explanation)
    }
}

/// Quiz made of multiple-choice items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// At least one question
    pub questions: Vec<QuizItem>,
}

/// One quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    /// Question stem
    pub question: String,
    /// Exactly four options
    pub options: Vec<String>,
    /// Index of the correct option
    pub correct_index: usize,
    /// Explanation
    pub explanation: String,
}

impl QuizItem {
    fn check_shape(&self) -> Result<(), ShapeViolation> {
        require_text("question", &self.question)?;
        check_options(&self.options, self.correct_index)?;
        require_text("explanation", &self.explanation)
    }
}

/// Structured topic explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    /// Definition of the topic
    pub definition: String,
    /// Key features
    pub key_features: Vec<String>,
    /// Diagnostic approach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    /// Management basics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_basics: Option<String>,
    /// Considerations for low-resource settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_resource_considerations: Option<String>,
}

/// Step-by-step guideline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidelines {
    /// Ordered steps
    pub steps: Vec<GuideStep>,
    /// Warnings
    pub warnings: Vec<String>,
    /// Mandatory note on the provenance of the content
    pub source_note: String,
}

/// One guideline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideStep {
    /// Step title
    pub title: String,
    /// Step details
    #[serde(default)]
    pub details: Vec<String>,
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    /// Human-readable message
    pub error: String,
    /// Excerpt of the upstream text, at most 1000 characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

fn require_text(field: &'static str, value: &str) -> Result<(), ShapeViolation> {
    if value.trim().is_empty() {
        Err(ShapeViolation::Empty(field))
    } else {
        Ok(())
    }
}

fn check_options(options: &[String], correct_index: usize) -> Result<(), ShapeViolation> {
    if options.len() != OPTION_COUNT {
        return Err(ShapeViolation::OptionCount(options.len()));
    }
    if correct_index >= OPTION_COUNT {
        return Err(ShapeViolation::CorrectIndex(correct_index));
    }
    Ok(())
}

// Models sometimes answer "Medium" or "intermediate"; anything unrecognised
// becomes `None` and is filled from the request.
fn lenient_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse::<Difficulty>().ok()))
}
