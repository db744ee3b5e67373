//! Attempt scoring: points for canonical matches, percentage of the maximum.

use std::collections::HashMap;

use serde::Serialize;

use super::is_correct;
use crate::models::{McqQuestion, SubmittedAnswer};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub question_id: String,
    pub is_correct: bool,
    pub points_earned: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptScore {
    pub score: u32,
    pub max_score: u32,
    /// 0 to 100, rounded to two decimals. 0 when the question set carries no points.
    pub percentage: f64,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub graded: Vec<GradedAnswer>,
}

/// Grades `answers` against `questions`.
///
/// - answers for unknown question ids are skipped
/// - a question answered several times counts once, with its last answer
/// - graded answers follow first-answer order
pub fn score_attempt(questions: &[McqQuestion], answers: &[SubmittedAnswer]) -> AttemptScore {
    let by_id: HashMap<&str, &McqQuestion> =
        questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let mut graded: Vec<GradedAnswer> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for answer in answers {
        let Some(question) = by_id.get(answer.question_id.as_str()) else {
            continue;
        };
        let correct = is_correct(Some(&answer.answer), Some(&question.correct));
        let entry = GradedAnswer {
            question_id: question.id.clone(),
            is_correct: correct,
            points_earned: if correct { question.points } else { 0 },
        };
        match slot.get(question.id.as_str()) {
            Some(&index) => graded[index] = entry,
            None => {
                slot.insert(question.id.as_str(), graded.len());
                graded.push(entry);
            }
        }
    }

    let score: u32 = graded.iter().map(|g| g.points_earned).sum();
    let max_score: u32 = questions.iter().map(|q| q.points).sum();
    let percentage = if max_score > 0 {
        (f64::from(score) / f64::from(max_score) * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    AttemptScore {
        score,
        max_score,
        percentage,
        total_questions: questions.len(),
        answered_questions: graded.len(),
        graded,
    }
}
