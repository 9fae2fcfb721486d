//! Multiple-choice knowledge quiz.
//!
//! Questions are generated in a fixed block format and parsed locally;
//! grading needs no further call to the generation service.

use std::collections::BTreeMap;

use super::{InputError, ORGANISATION};
use crate::generation::GenerationRequest;
use crate::models::*;

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 6;
pub const DEFAULT_QUESTIONS: usize = 3;

const BLOCK_END: &str = "---END_QUESTION---";
const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Reason recorded on the slot when generated text holds no usable question.
pub const UNPARSEABLE: &str =
    "No valid questions could be parsed from the generated quiz. Please try generating again.";

pub fn quiz_request(num_questions: Option<usize>) -> Result<GenerationRequest, InputError> {
    let n = num_questions.unwrap_or(DEFAULT_QUESTIONS);
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&n) {
        return Err(InputError::OutOfRange {
            field: "number of questions",
            min: MIN_QUESTIONS,
            max: MAX_QUESTIONS,
        });
    }

    let system = format!(
        "You are a cybersecurity quiz master for {ORGANISATION}. Write {n} distinct multiple-choice \
         questions on cybersecurity compliance (NIS2, GDPR, the Irish Data Protection Act 2018), \
         operational technology security in rail, or everyday security practice for staff. Each \
         question has four plausible options A to D, exactly one correct answer and a short \
         explanation. Use exactly this format for every question, ending each block with the \
         separator line:\n\
         Question: <question text>\n\
         A: <option A>\n\
         B: <option B>\n\
         C: <option C>\n\
         D: <option D>\n\
         Correct Answer: <A, B, C or D>\n\
         Explanation: <why the answer is correct>\n\
         {BLOCK_END}\n\
         Output nothing but these blocks."
    );
    let user = format!(
        "Generate exactly {n} cybersecurity quiz questions now, following the format precisely."
    );

    let max_tokens = 300 * n as u32;
    Ok(GenerationRequest::new(Prompt::new(system, user), 0.75, max_tokens))
}

/// Text after the first `:` of `line` when it starts with `label`
/// (case-insensitive).
fn field<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = &line[label.len()..];
    rest.strip_prefix(':').map(str::trim)
}

fn parse_block(block: &str) -> Option<QuizQuestion> {
    let mut text = None;
    let mut options = BTreeMap::new();
    let mut correct_answer = None;
    let mut explanation = None;

    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(value) = field(line, "question") {
            text = Some(value.to_string());
        } else if let Some(value) = field(line, "correct answer") {
            correct_answer = value
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .filter(|c| LETTERS.contains(c));
        } else if let Some(value) = field(line, "explanation") {
            explanation = Some(value.to_string());
        } else if let Some((letter, value)) = LETTERS
            .iter()
            .find_map(|l| field(line, &l.to_string()).map(|v| (*l, v)))
        {
            options.insert(letter, value.to_string());
        }
    }

    let complete = options.len() == LETTERS.len();
    match (text, correct_answer, explanation) {
        (Some(text), Some(correct_answer), Some(explanation))
            if complete && !text.is_empty() && !explanation.is_empty() =>
        {
            Some(QuizQuestion {
                text,
                options,
                correct_answer,
                explanation,
            })
        }
        _ => None,
    }
}

/// Parse generated quiz text, keeping only complete question blocks.
pub fn parse_quiz(raw: &str) -> Vec<QuizQuestion> {
    let questions: Vec<QuizQuestion> = raw.split(BLOCK_END).filter_map(parse_block).collect();
    let blocks = raw.split(BLOCK_END).filter(|b| !b.trim().is_empty()).count();
    if questions.len() < blocks {
        tracing::warn!(
            parsed = questions.len(),
            blocks,
            "skipped malformed quiz question blocks"
        );
    }
    questions
}

/// Check that generated text holds at least one question.
pub fn validate(raw: &str) -> Result<(), String> {
    if parse_quiz(raw).is_empty() {
        Err(UNPARSEABLE.to_string())
    } else {
        Ok(())
    }
}

/// Answers as stored in the slot's user response.
pub fn encode_answers(answers: &QuizAnswers) -> String {
    serde_json::to_string(answers).unwrap_or_default()
}

pub fn decode_answers(raw: &str) -> Option<QuizAnswers> {
    serde_json::from_str(raw).ok()
}

/// Keep only answers that name a real question and option.
pub fn sanitize_answers(questions: &[QuizQuestion], answers: &QuizAnswers) -> QuizAnswers {
    answers
        .iter()
        .filter(|(index, _)| **index < questions.len())
        .map(|(index, letter)| (*index, letter.to_ascii_uppercase()))
        .filter(|(_, letter)| LETTERS.contains(letter))
        .collect()
}

/// Grade `answers` against `questions`. Unanswered questions count as wrong.
pub fn grade(questions: &[QuizQuestion], answers: &QuizAnswers) -> QuizGrade {
    let graded: Vec<QuestionGrade> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = answers.get(&index).copied();
            QuestionGrade {
                index,
                question: question.text.clone(),
                selected,
                correct_answer: question.correct_answer,
                correct_text: question
                    .options
                    .get(&question.correct_answer)
                    .cloned()
                    .unwrap_or_default(),
                is_correct: selected == Some(question.correct_answer),
                explanation: question.explanation.clone(),
            }
        })
        .collect();

    let correct = graded.iter().filter(|q| q.is_correct).count();
    let total = graded.len();
    let percentage = if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    };

    QuizGrade {
        correct,
        total,
        percentage,
        questions: graded,
    }
}

/// Everything the quiz page needs, derived from the slot without side effects.
pub fn view(item: GeneratedItem) -> QuizView {
    let questions = item.content().map(parse_quiz).unwrap_or_default();
    let answers = item.user_response.as_deref().and_then(decode_answers);
    let graded = answers.as_ref().map(|a| grade(&questions, a));
    QuizView {
        item,
        questions,
        answers,
        grade: graded,
    }
}
