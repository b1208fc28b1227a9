//! Turns buffered model output into a typed [`CompletionResult`].
//!
//! Every fix-up the model output may need happens here, once: fence
//! stripping, brace recovery, the missing `type` tag, and the mcq difficulty.

use medestudia_core::{ChatAnswer, CompletionRequest, CompletionResult, Mode, Tool, educational_note};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("code fence pattern is valid"));

/// Error message for output that is not a JSON object at all.
pub const NON_JSON_MESSAGE: &str = "Model returned non-JSON";

/// Wraps plain chat text, adding the study note in clinical-study mode.
pub fn chat_result(text: &str, request: &CompletionRequest) -> CompletionResult {
    let note = (*request.mode() == Mode::ClinicalStudy)
        .then(|| educational_note(*request.language()).to_string());
    CompletionResult::Chat(ChatAnswer {
        answer: text.to_string(),
        note,
    })
}

/// Normalises structured output for `request`.
///
/// Failures are reported as the error variant carrying a raw excerpt, never
/// as an `Err`: the model was reached, it just answered badly.
#[instrument(skip_all, fields(tool = %request.tool(), mode = %request.mode(), chars = text.chars().count()))]
pub fn normalize_structured(text: &str, request: &CompletionRequest) -> CompletionResult {
    let Some(mut object) = parse_object(text) else {
        warn!("Model output is not a JSON object");
        return CompletionResult::error(NON_JSON_MESSAGE, Some(text));
    };

    inject_type(&mut object, request);

    let result = match serde_json::from_value::<CompletionResult>(Value::Object(object)) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Model output does not decode as a result");
            return invalid_structure(request, text);
        }
    };

    if !accepts(request, &result) {
        warn!(variant = ?result.tool(), "Model answered with the wrong result type");
        return invalid_structure(request, text);
    }
    if let Err(violation) = result.check_shape() {
        warn!(%violation, "Model output failed shape check");
        return invalid_structure(request, text);
    }

    debug!("Model output normalised");
    fill_difficulty(result, request)
}

/// Parses the output as a JSON object, retrying on the outermost brace span.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    parse_cleaned(text).or_else(|| {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        (start < end).then(|| parse_cleaned(&text[start..=end]))?
    })
}

fn parse_cleaned(text: &str) -> Option<Map<String, Value>> {
    let cleaned = CODE_FENCE.replace_all(text, "");
    match serde_json::from_str::<Value>(cleaned.trim()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Sets `type` when the model left it out or empty.
fn inject_type(object: &mut Map<String, Value>, request: &CompletionRequest) {
    let present = object
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    if present {
        return;
    }
    let tool = match request.tool() {
        Tool::Chat if *request.mode() == Mode::ClinicalGuidelines => {
            if object.contains_key("steps") {
                Tool::Guides
            } else {
                Tool::Chat
            }
        }
        tool => *tool,
    };
    debug!(%tool, "Injecting missing type tag");
    object.insert("type".to_string(), Value::String(tool.to_string()));
}

/// Whether `result` answers the tool that was asked for.
fn accepts(request: &CompletionRequest, result: &CompletionResult) -> bool {
    match (request.tool(), result.tool()) {
        (_, None) => false,
        (Tool::Chat, Some(Tool::Guides)) => *request.mode() == Mode::ClinicalGuidelines,
        (asked, Some(answered)) => *asked == answered,
    }
}

fn fill_difficulty(result: CompletionResult, request: &CompletionRequest) -> CompletionResult {
    match result {
        CompletionResult::Mcq(mut mcq) => {
            mcq.difficulty.get_or_insert(request.difficulty());
            CompletionResult::Mcq(mcq)
        }
        other => other,
    }
}

fn invalid_structure(request: &CompletionRequest, text: &str) -> CompletionResult {
    CompletionResult::error(invalid_structure_message(*request.tool()), Some(text))
}

/// Error message for output that parsed but has the wrong shape.
pub fn invalid_structure_message(tool: Tool) -> &'static str {
    match tool {
        Tool::Chat => "Invalid chat structure",
        Tool::Mcq => "Invalid MCQ structure",
        Tool::Quiz => "Invalid quiz structure",
        Tool::Explain => "Invalid explain structure",
        Tool::Guides => "Invalid guidelines structure",
    }
}
