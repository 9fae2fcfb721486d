//! Training modules: which slot each user action writes to and the
//! generation request it sends.
//!
//! Nothing here talks to the network. Each module turns validated user
//! input into a [`GenerationRequest`]; the HTTP layer drives the session
//! store around the actual call.

pub mod advisor;
pub mod incident;
pub mod phishing;
pub mod quiz;
pub mod scenario;

use crate::models::SlotKey;

/// Organisation the training content is written for.
pub const ORGANISATION: &str = "Iarnród Éireann (Irish Rail)";

/// Training module identifiers.
pub mod modules {
    pub const PHISHING: &str = "phishing";
    pub const SCENARIO: &str = "scenario";
    pub const QUIZ: &str = "quiz";
    pub const INCIDENT_RESPONSE: &str = "incident_response";
    pub const COMPLIANCE: &str = "compliance";
    pub const REFERENCE: &str = "reference";
}

pub fn phishing_sample_key() -> SlotKey {
    SlotKey::new(modules::PHISHING, "sample")
}

pub fn phishing_analysis_key() -> SlotKey {
    SlotKey::new(modules::PHISHING, "analysis")
}

pub fn scenario_key() -> SlotKey {
    SlotKey::new(modules::SCENARIO, "current")
}

pub fn quiz_key() -> SlotKey {
    SlotKey::new(modules::QUIZ, "questions")
}

pub fn incident_guide_key() -> SlotKey {
    SlotKey::new(modules::INCIDENT_RESPONSE, "custom_guide")
}

pub fn compliance_answer_key() -> SlotKey {
    SlotKey::new(modules::COMPLIANCE, "answer")
}

pub fn reference_answer_key() -> SlotKey {
    SlotKey::new(modules::REFERENCE, "answer")
}

/// Rejected user input, reported back before anything is generated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("{0} cannot be empty")]
    Blank(&'static str),

    #[error("unknown {field}: {value}")]
    UnknownChoice { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: usize,
        max: usize,
    },
}

/// Trimmed `value`, or an error naming `field` if nothing is left.
pub fn require_text<'a>(field: &'static str, value: &'a str) -> Result<&'a str, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(InputError::Blank(field))
    } else {
        Ok(trimmed)
    }
}

/// `value` if it is one of `choices`.
pub fn require_choice<'a>(
    field: &'static str,
    value: &str,
    choices: &[&'a str],
) -> Result<&'a str, InputError> {
    choices
        .iter()
        .find(|choice| **choice == value.trim())
        .copied()
        .ok_or_else(|| InputError::UnknownChoice {
            field,
            value: value.to_string(),
        })
}
