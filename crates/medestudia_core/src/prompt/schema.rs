//! JSON response schemas embedded in structured system prompts.
//!
//! Field names are written once per tool; the locale only supplies example
//! values, so Spanish and English prompts always request the same shape.

use super::text::SchemaText;
use crate::{Mode, Tool};
use serde_json::{Value, json};

/// Schema the model is asked to follow, or `None` for prose replies.
pub(crate) fn schema_for(tool: Tool, mode: Mode, text: &SchemaText) -> Option<Value> {
    match tool {
        Tool::Chat if mode == Mode::ClinicalGuidelines => Some(guides(text)),
        Tool::Chat => None,
        Tool::Mcq => Some(mcq(text)),
        Tool::Quiz => Some(quiz(text)),
        Tool::Explain => Some(explain(text)),
        Tool::Guides => Some(guides(text)),
    }
}

fn options(text: &SchemaText) -> Value {
    json!((1..=4).map(|n| format!("{} {}", text.option, n)).collect::<Vec<_>>())
}

fn mcq(text: &SchemaText) -> Value {
    json!({
        "question": text.question,
        "options": options(text),
        "correctIndex": 0,
        "explanation": text.explanation,
        "difficulty": "easy|medium|hard"
    })
}

fn quiz(text: &SchemaText) -> Value {
    json!({
        "questions": [{
            "question": text.question,
            "options": options(text),
            "correctIndex": 0,
            "explanation": text.explanation
        }]
    })
}

fn explain(text: &SchemaText) -> Value {
    json!({
        "definition": text.definition,
        "keyFeatures": [text.feature, text.feature_more],
        "diagnosis": text.diagnosis,
        "managementBasics": text.management,
        "lowResourceConsiderations": text.low_resource
    })
}

fn guides(text: &SchemaText) -> Value {
    json!({
        "steps": [{
            "title": text.step_title,
            "details": [text.step_detail, text.step_detail_more]
        }],
        "warnings": [text.warning, text.warning_more],
        "sourceNote": text.source_note
    })
}
