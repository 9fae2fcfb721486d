use serde::{Deserialize, Serialize};

use super::QuizAnswers;

/// Input for generating a simulated phishing email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhishingSampleInput {
    /// One of the catalogue's phishing email types.
    pub email_type: String,
}

/// The user's explanation of the red flags in the simulated email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhishingExplanationInput {
    pub explanation: String,
}

/// An email the user received and wants assessed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAnalysisInput {
    pub email_text: String,
}

/// Input for generating an incident scenario or a tailored response guide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub category: String,
}

/// The user's proposed strategy for the current scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResponseInput {
    pub strategy: String,
}

/// Input for generating a new quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizInput {
    /// Number of questions, 1 to 6. Defaults to 3.
    pub num_questions: Option<usize>,
}

/// The user's quiz selections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswersInput {
    pub answers: QuizAnswers,
}

/// A free-form question for one of the Q&A assistants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionInput {
    pub query: String,
}
