//! Password generation and strength scoring.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::*;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>/?";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 64;

/// Crack times under an hour make a high score suspect.
const GUESSABLE_BELOW_SECS: f64 = 3600.0;

/// Random password drawn from the selected character classes.
///
/// Length is clamped to `MIN_LENGTH..=MAX_LENGTH`.
pub fn generate_password(options: &PasswordOptions) -> String {
    let mut pool: Vec<char> = LOWERCASE.chars().collect();
    if options.uppercase {
        pool.extend(UPPERCASE.chars());
    }
    if options.digits {
        pool.extend(DIGITS.chars());
    }
    if options.symbols {
        pool.extend(SYMBOLS.chars());
    }

    let length = options.length.clamp(MIN_LENGTH, MAX_LENGTH);
    let mut rng = rand::rng();
    let mut chars: Vec<char> = (0..length)
        .map(|_| pool[rng.random_range(0..pool.len())])
        .collect();
    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

/// Scores how hard a password is to guess. Pure and infallible.
pub trait StrengthEstimator: Send + Sync {
    fn score(&self, candidate: &str, user_inputs: &[&str]) -> StrengthScore;
}

/// Estimator backed by zxcvbn.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZxcvbnEstimator;

impl StrengthEstimator for ZxcvbnEstimator {
    fn score(&self, candidate: &str, user_inputs: &[&str]) -> StrengthScore {
        let entropy = match zxcvbn::zxcvbn(candidate, user_inputs) {
            Ok(entropy) => entropy,
            Err(_) => return blank_score(),
        };

        let (warning, suggestions) = match entropy.feedback().as_ref() {
            Some(feedback) => (
                feedback.warning().map(|w| w.to_string()),
                feedback.suggestions().iter().map(|s| s.to_string()).collect(),
            ),
            None => (None, Vec::new()),
        };

        StrengthScore {
            score: entropy.score().min(4),
            warning,
            suggestions,
            crack_time_display: entropy
                .crack_times()
                .offline_fast_hashing_1e10_per_second()
                .to_string(),
            crack_time_seconds: entropy.guesses() as f64 / 1e10,
        }
    }
}

fn blank_score() -> StrengthScore {
    StrengthScore {
        score: 0,
        warning: Some("Please enter a password to check its strength.".to_string()),
        suggestions: Vec::new(),
        crack_time_display: "instant".to_string(),
        crack_time_seconds: 0.0,
    }
}

/// Score `candidate` and interpret the result for display.
pub fn check_strength(
    estimator: &dyn StrengthEstimator,
    candidate: &str,
    user_inputs: &[String],
) -> StrengthReport {
    if candidate.is_empty() {
        return strength_report(blank_score());
    }
    let inputs: Vec<&str> = user_inputs.iter().map(String::as_str).collect();
    strength_report(estimator.score(candidate, &inputs))
}

/// Turn a raw score into levels and feedback lines.
pub fn strength_report(score: StrengthScore) -> StrengthReport {
    let level = StrengthLevel::from_score(score.score);
    let potentially_guessable = score.score >= 3 && score.crack_time_seconds < GUESSABLE_BELOW_SECS;

    let mut feedback = Vec::new();
    if potentially_guessable {
        feedback.push(format!(
            "Rated {} but contains patterns or words that make it easier to guess than the score suggests.",
            level.label()
        ));
    }
    feedback.push(format!("Overall score: {}/4", score.score));
    if let Some(warning) = score.warning {
        feedback.push(format!("Warning: {}", warning));
    }
    for suggestion in score.suggestions {
        feedback.push(format!("Suggestion: {}", suggestion));
    }
    feedback.push(format!(
        "Estimated time to crack (fast offline hashing): {}",
        score.crack_time_display
    ));

    StrengthReport {
        score: score.score,
        level,
        potentially_guessable,
        feedback,
        crack_time_display: score.crack_time_display,
    }
}
