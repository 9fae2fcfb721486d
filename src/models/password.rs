use serde::{Deserialize, Serialize};

/// Character classes and length for a generated password.
///
/// Lowercase letters are always included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordOptions {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_true")]
    pub uppercase: bool,
    #[serde(default = "default_true")]
    pub digits: bool,
    #[serde(default = "default_true")]
    pub symbols: bool,
}

fn default_length() -> usize {
    12
}

fn default_true() -> bool {
    true
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: default_length(),
            uppercase: true,
            digits: true,
            symbols: true,
        }
    }
}

/// Raw output of a strength estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthScore {
    /// 0 (worst) to 4 (best).
    pub score: u8,
    pub warning: Option<String>,
    pub suggestions: Vec<String>,
    /// Estimated time to crack under fast offline hashing, human readable.
    pub crack_time_display: String,
    /// Same estimate in seconds.
    pub crack_time_seconds: f64,
}

/// Strength level shown to the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl StrengthLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::VeryWeak,
            1 => Self::Weak,
            2 => Self::Moderate,
            3 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }
}

/// A strength score interpreted for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthReport {
    pub score: u8,
    pub level: StrengthLevel,
    /// High score, but the password falls to a fast offline attack quickly.
    pub potentially_guessable: bool,
    pub feedback: Vec<String>,
    pub crack_time_display: String,
}

/// Request body for strength checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthCheckInput {
    pub candidate: String,
    /// Words the password should not be built from (names, usernames).
    #[serde(default)]
    pub user_inputs: Vec<String>,
}

/// A generated password together with its strength.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPassword {
    pub password: String,
    pub strength: StrengthReport,
}
