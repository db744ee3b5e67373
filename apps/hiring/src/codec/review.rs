//! Review model for a completed MCQ attempt: which rendered option is the
//! correct one, which is the candidate's wrong pick, and the per-question
//! status tag.

use serde::Serialize;
use serde_json::Value;

use super::{canonicalize, canonicalize_opt, display_answer, is_correct, CanonicalAnswer};
use crate::models::{McqQuestion, SubmittedAnswer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Correct,
    Incorrect,
    /// Attempt submitted without an answer to this question.
    Skipped,
    NotAnswered,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionMark {
    pub text: String,
    pub is_correct: bool,
    /// Set only when the candidate answered wrongly and picked this option.
    pub is_candidate_choice: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionReview {
    pub question_id: String,
    pub status: QuestionStatus,
    pub options: Vec<OptionMark>,
    /// `None` when there is no answer record at all.
    pub answer_display: Option<String>,
}

/// Options arrive as an array, an object (values in key order) or a single
/// string. Each becomes its rendered text.
pub fn option_values(options: &Value) -> Vec<&Value> {
    match options {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        Value::String(_) => vec![options],
        _ => Vec::new(),
    }
}

pub fn option_text(option: &Value) -> String {
    match option {
        Value::String(s) => s.clone(),
        Value::Object(map) => ["text", "value", "label"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| option.to_string()),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Marks each option against the canonical correct value and, for a wrong
/// answer, the candidate's canonical answer. An option matches when either
/// its raw value or its rendered text canonicalizes to the target.
pub fn mark_options(
    options: &Value,
    correct: &Value,
    answer: Option<&Value>,
) -> Vec<OptionMark> {
    let correct_canonical = canonicalize(correct);
    let wrong_choice = answer
        .filter(|a| !is_correct(Some(*a), Some(correct)))
        .map(canonicalize)
        .filter(CanonicalAnswer::is_answered);

    option_values(options)
        .into_iter()
        .map(|option| {
            let text = option_text(option);
            let matches = |target: &CanonicalAnswer| {
                target.is_answered()
                    && (canonicalize(option) == *target
                        || canonicalize_opt(Some(&Value::String(text.clone()))) == *target)
            };
            OptionMark {
                is_correct: matches(&correct_canonical),
                is_candidate_choice: wrong_choice.as_ref().is_some_and(|c| matches(c)),
                text,
            }
        })
        .collect()
}

pub fn question_status(
    question: &McqQuestion,
    answer: Option<&SubmittedAnswer>,
    attempt_submitted: bool,
) -> QuestionStatus {
    match answer {
        Some(a) if is_correct(Some(&a.answer), Some(&question.correct)) => QuestionStatus::Correct,
        Some(_) => QuestionStatus::Incorrect,
        None if attempt_submitted => QuestionStatus::Skipped,
        None => QuestionStatus::NotAnswered,
    }
}

/// Builds the review card for every question of an attempt, in question order.
pub fn review_attempt(
    questions: &[McqQuestion],
    answers: &[SubmittedAnswer],
    attempt_submitted: bool,
) -> Vec<QuestionReview> {
    questions
        .iter()
        .map(|question| {
            // Last submission for a question wins.
            let answer = answers.iter().rev().find(|a| a.question_id == question.id);
            QuestionReview {
                question_id: question.id.clone(),
                status: question_status(question, answer, attempt_submitted),
                options: mark_options(
                    &question.options,
                    &question.correct,
                    answer.map(|a| &a.answer),
                ),
                answer_display: answer.map(|a| display_answer(Some(&a.answer))),
            }
        })
        .collect()
}
