use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One multiple-choice question parsed from generated quiz text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub text: String,
    /// Options keyed by letter, always exactly `A` through `D`.
    pub options: BTreeMap<char, String>,
    pub correct_answer: char,
    pub explanation: String,
}

/// The user's selections, keyed by zero-based question index.
pub type QuizAnswers = BTreeMap<usize, char>;

/// Grading of a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGrade {
    pub index: usize,
    pub question: String,
    /// `None` when the question was left unanswered.
    pub selected: Option<char>,
    pub correct_answer: char,
    pub correct_text: String,
    pub is_correct: bool,
    pub explanation: String,
}

/// Local grading of a submitted quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizGrade {
    pub correct: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent; 0 for an empty quiz.
    pub percentage: u32,
    pub questions: Vec<QuestionGrade>,
}

/// Render state of the quiz module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizView {
    pub item: super::GeneratedItem,
    pub questions: Vec<QuizQuestion>,
    pub answers: Option<QuizAnswers>,
    pub grade: Option<QuizGrade>,
}
