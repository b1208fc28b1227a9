//! Prompt construction.
//!
//! Pure functions from a [`CompletionRequest`] to the system and user
//! prompts sent upstream. No I/O and no failure modes: absent context
//! fields are simply left out of the templates.

mod schema;
mod text;
mod user;

use crate::{CompletionRequest, Language, Mode, Tool};
use derive_getters::Getters;
use serde_json::Value;

/// System and user prompt for one upstream exchange.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PromptPair {
    /// Persona and formatting rules
    system: String,
    /// The caller's question in template form
    user: String,
}

/// Builds both prompts for `request`.
///
/// # Examples
///
/// ```
/// use medestudia_core::{CompletionRequest, Language, Mode, Tool, build_prompts};
///
/// let req = CompletionRequest::new(Tool::Mcq, Mode::Preclinical, Language::En, "asthma", None, 2000);
/// let prompts = build_prompts(&req);
/// assert!(prompts.system().contains("\"correctIndex\""));
/// assert!(prompts.user().contains("\"asthma\""));
/// ```
pub fn build_prompts(request: &CompletionRequest) -> PromptPair {
    PromptPair {
        system: build_system_prompt(*request.tool(), *request.mode(), *request.language()),
        user: user::build_user_prompt(request),
    }
}

/// System prompt for a (tool, mode, language) triple.
pub fn build_system_prompt(tool: Tool, mode: Mode, language: Language) -> String {
    let text = text::text(language);
    let guidance = match tool {
        Tool::Chat => match mode {
            Mode::Preclinical => text.chat_preclinical,
            Mode::ClinicalStudy => text.chat_clinical_study,
            Mode::ClinicalGuidelines => text.chat_guidelines,
        },
        Tool::Mcq => text.mcq,
        Tool::Quiz => text.quiz,
        Tool::Explain => text.explain,
        Tool::Guides => text.guides,
    };

    let mut prompt = format!("{}\n{}", text.base, guidance);
    if let Some(schema) = schema::schema_for(tool, mode, &text.schema) {
        prompt.push('\n');
        prompt.push_str(text.json_structure);
        prompt.push('\n');
        prompt.push_str(&serde_json::to_string_pretty(&schema).unwrap_or_default());
    }
    prompt
}

/// JSON shape requested from the model, if the reply is structured.
pub fn response_schema(tool: Tool, mode: Mode, language: Language) -> Option<Value> {
    schema::schema_for(tool, mode, &text::text(language).schema)
}

/// Note attached to clinical-study chat answers.
pub fn educational_note(language: Language) -> &'static str {
    text::text(language).study_note
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_INPUT_CHARS;
    use std::collections::BTreeSet;
    use strum::IntoEnumIterator;

    fn keys(value: &Value, prefix: &str, out: &mut BTreeSet<String>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let path = format!("{}/{}", prefix, key);
                    out.insert(path.clone());
                    keys(child, &path, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    keys(item, prefix, out);
                }
            }
            _ => {}
        }
    }

    fn key_set(tool: Tool, mode: Mode, language: Language) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if let Some(schema) = response_schema(tool, mode, language) {
            keys(&schema, "", &mut out);
        }
        out
    }

    #[test]
    fn test_schema_fields_match_across_locales() {
        for tool in Tool::iter() {
            for mode in Mode::iter() {
                assert_eq!(
                    key_set(tool, mode, Language::Es),
                    key_set(tool, mode, Language::En),
                    "schema drift for {tool}/{mode}"
                );
            }
        }
    }

    #[test]
    fn test_explain_prompts_differ_only_in_wording() {
        let es = build_system_prompt(Tool::Explain, Mode::Preclinical, Language::Es);
        let en = build_system_prompt(Tool::Explain, Mode::Preclinical, Language::En);
        assert_ne!(es, en);
        for field in [
            "definition",
            "keyFeatures",
            "diagnosis",
            "managementBasics",
            "lowResourceConsiderations",
        ] {
            let quoted = format!("\"{}\"", field);
            assert!(es.contains(&quoted) && en.contains(&quoted), "missing {field}");
        }
        assert!(es.contains("español"));
        assert!(en.contains("English"));
    }

    #[test]
    fn test_conversational_chat_has_no_schema() {
        let prompt = build_system_prompt(Tool::Chat, Mode::Preclinical, Language::Es);
        assert!(!prompt.contains("JSON"));
        assert!(response_schema(Tool::Chat, Mode::ClinicalStudy, Language::En).is_none());
    }

    #[test]
    fn test_guideline_chat_requests_guides_shape() {
        let prompt = build_system_prompt(Tool::Chat, Mode::ClinicalGuidelines, Language::En);
        assert!(prompt.contains("\"sourceNote\""));
        assert!(prompt.contains("RAG"));
    }

    #[test]
    fn test_schema_block_is_valid_json() {
        let prompt = build_system_prompt(Tool::Quiz, Mode::Preclinical, Language::Es);
        let start = prompt.find('{').unwrap();
        let parsed: Value = serde_json::from_str(&prompt[start..]).unwrap();
        assert_eq!(parsed["questions"][0]["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_build_prompts_pairs_system_and_user() {
        let req = crate::CompletionRequest::new(
            Tool::Guides,
            Mode::ClinicalGuidelines,
            Language::Es,
            "shock séptico",
            None,
            MAX_INPUT_CHARS,
        );
        let prompts = build_prompts(&req);
        assert!(prompts.system().contains("paso a paso"));
        assert!(prompts.user().contains("\"shock séptico\""));
    }
}
