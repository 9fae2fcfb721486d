use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recently published vulnerability advisory (a CVE record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    /// CVE identifier, e.g. `CVE-2024-12345`.
    pub identifier: String,
    /// English description from the record.
    pub description: String,
    pub published: Option<DateTime<Utc>>,
    /// CVSS v3.1 base score, when the record carries one.
    pub severity_score: Option<f64>,
    /// CVSS v3.1 base severity label as published.
    pub severity: Option<String>,
    /// CVSS v3.1 vector string.
    pub vector: Option<String>,
    pub url: String,
}

impl Advisory {
    /// Severity band derived from the base score.
    pub fn band(&self) -> Option<SeverityBand> {
        self.severity_score.map(SeverityBand::from_score)
    }
}

/// Qualitative CVSS severity rating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityBand {
    /// Band for a CVSS base score on the standard 0.0 to 10.0 scale.
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Critical
        } else if score >= 7.0 {
            Self::High
        } else if score >= 4.0 {
            Self::Medium
        } else if score > 0.0 {
            Self::Low
        } else {
            Self::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Query parameters for the advisory listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisoryQuery {
    /// How far back to look, in days. Defaults to 30.
    pub window_days: Option<u32>,
    /// Maximum number of advisories to return. Defaults to 5.
    pub limit: Option<usize>,
}

/// Advisories plus the window they were drawn from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryListing {
    pub window_days: u32,
    pub fetched_at: DateTime<Utc>,
    pub advisories: Vec<Advisory>,
}
