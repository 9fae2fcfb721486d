//! Tailored incident response guides.

use super::{require_choice, InputError, ORGANISATION};
use crate::generation::GenerationRequest;
use crate::models::Prompt;

pub const GUIDE_CATEGORIES: &[&str] = &[
    "Ransomware Attack on Critical Systems",
    "Major Data Breach (Customer/Employee PII)",
    "Targeted Attack on Rail Signalling (OT System)",
    "Compromise of Cloud Services (e.g., Ticketing Platform)",
    "Widespread Phishing Leading to Multiple Account Breaches",
    "Insider Threat Data Exfiltration",
    "Denial-of-Service Attack Affecting Operations",
];

pub fn guide_request(category: &str) -> Result<GenerationRequest, InputError> {
    let category = require_choice("guide category", category, GUIDE_CATEGORIES)?;

    let system = format!(
        "You are a senior incident response planner for the rail sector, writing for {ORGANISATION}. \
         Produce a step-by-step response guide for the given incident category, organised by phase: \
         Preparation (brief), Identification, Containment, Eradication, Recovery, Post-Incident \
         Analysis. Give concrete actions for each phase, covering IT and OT where relevant, and cite \
         the applicable reporting duties (NIS2 24-hour early warning and 72-hour notification, GDPR \
         72-hour breach notification). Output only the guide, with no commentary around it."
    );
    let user = format!(
        "Generate a custom incident response guide for {ORGANISATION} for the following incident \
         category: {category}."
    );

    Ok(GenerationRequest::new(Prompt::new(system, user), 0.6, 1200))
}
