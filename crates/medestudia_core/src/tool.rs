//! Enumerated request selectors: tool, pedagogical mode, language, difficulty.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Content-generation tool requested by the caller.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tool {
    /// Free-form conversation
    Chat,
    /// Single multiple-choice question
    Mcq,
    /// Five multiple-choice questions
    Quiz,
    /// Structured topic explanation
    Explain,
    /// Step-by-step clinical guideline
    Guides,
}

impl Tool {
    /// Tools whose reply is a JSON object rather than prose.
    pub fn is_structured(self) -> bool {
        !matches!(self, Tool::Chat)
    }
}

/// Pedagogical context shaping tone and disclaimers.
///
/// Serialized with the literals the web client sends; English spellings are
/// accepted on input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum Mode {
    /// Preclinical basic sciences
    #[serde(rename = "preclinico", alias = "preclinical")]
    #[strum(to_string = "preclinico", serialize = "preclinical")]
    Preclinical,
    /// Clinical study with hypothetical cases
    #[serde(rename = "clinico_estudio", alias = "clinical-study")]
    #[strum(to_string = "clinico_estudio", serialize = "clinical-study")]
    ClinicalStudy,
    /// Clinical guideline consultation
    #[serde(rename = "clinico_guias", alias = "clinical-guidelines")]
    #[strum(to_string = "clinico_guias", serialize = "clinical-guidelines")]
    ClinicalGuidelines,
}

/// Response language.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// Spanish
    Es,
    /// English
    En,
}

/// Question difficulty.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Easy
    Easy,
    /// Medium
    #[default]
    Medium,
    /// Hard
    Hard,
}
