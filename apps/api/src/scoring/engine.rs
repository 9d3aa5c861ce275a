//! Core scoring algorithm.
//!
//! 1. Align answers to questions: same count, same selection mode, indices in range.
//! 2. Per question: single → selected == key; multiple → exact set equality.
//!    No partial credit. A subset or superset is wrong.
//! 3. Per area: round(100 × correct / total), clamped to 0–100.
//! 4. Gaps: areas strictly below the threshold.

use indexmap::IndexMap;

use crate::contracts::answers::{Answer, AnswerSet};
use crate::contracts::quiz::{AnswerKey, GradedQuiz, Question};
use crate::scoring::{
    GapThreshold, QuestionResult, ScoredResult, ScoringError, SkillAreaMap,
};

/// Pairs every question with its answer, rejecting any misalignment.
///
/// Works for both quiz kinds; exploratory pipelines align answers without scoring them.
pub fn align<'q, 'a, Q: AsRef<Question>>(
    questions: &'q [Q],
    answers: &'a AnswerSet,
) -> Result<Vec<(&'q Q, &'a Answer)>, ScoringError> {
    if questions.len() != answers.len() {
        return Err(ScoringError::ShapeMismatch(format!(
            "expected {} answers, got {}",
            questions.len(),
            answers.len()
        )));
    }

    questions
        .iter()
        .zip(answers.iter())
        .enumerate()
        .map(|(i, (question, answer))| {
            let q = question.as_ref();
            if q.selection_mode != answer.selection_mode() {
                return Err(ScoringError::ShapeMismatch(format!(
                    "answer {i} is {:?} but question {i} is {:?}",
                    answer.selection_mode(),
                    q.selection_mode
                )));
            }
            if let Some(bad) = answer.selected().into_iter().find(|&s| s >= q.options.len()) {
                return Err(ScoringError::ShapeMismatch(format!(
                    "answer {i} selects option {bad} but question {i} has {} options",
                    q.options.len()
                )));
            }
            Ok((question, answer))
        })
        .collect()
}

/// Exact-match correctness. A skipped answer is never correct.
pub fn is_correct(key: &AnswerKey, answer: &Answer) -> bool {
    match (key, answer) {
        (
            AnswerKey::Single(correct),
            Answer::Single {
                selected_option_index,
            },
        ) => *selected_option_index == Some(*correct),
        (
            AnswerKey::Multiple(correct),
            Answer::Multiple {
                selected_option_indices,
            },
        ) => selected_option_indices == correct,
        _ => false,
    }
}

/// Scores a graded quiz.
///
/// Fails with `EmptyQuiz` when there are no questions, and with `ShapeMismatch`
/// when the answers or the area map do not line up with the quiz.
pub fn score(
    quiz: &GradedQuiz,
    answers: &AnswerSet,
    areas: &SkillAreaMap,
    threshold: GapThreshold,
) -> Result<ScoredResult, ScoringError> {
    if quiz.questions.is_empty() {
        return Err(ScoringError::EmptyQuiz);
    }
    if areas.len() != quiz.questions.len() {
        return Err(ScoringError::ShapeMismatch(format!(
            "skill-area map has {} labels for {} questions",
            areas.len(),
            quiz.questions.len()
        )));
    }

    let pairs = align(&quiz.questions, answers)?;

    // area → (correct, total), first-encountered order
    let mut tallies: IndexMap<&str, (usize, usize)> = IndexMap::new();
    let mut question_results = Vec::with_capacity(pairs.len());

    for (index, (question, answer)) in pairs.into_iter().enumerate() {
        let area = areas.label(index).unwrap_or(super::GENERAL_SKILL_AREA);
        let correct = is_correct(&question.key, answer);

        let tally = tallies.entry(area).or_insert((0, 0));
        tally.1 += 1;
        if correct {
            tally.0 += 1;
        }

        question_results.push(QuestionResult {
            index,
            skill_area: area.to_string(),
            correct,
        });
    }

    let total_count = question_results.len();
    let correct_count = question_results.iter().filter(|r| r.correct).count();

    let per_skill_area_proficiency: IndexMap<String, u8> = tallies
        .iter()
        .map(|(area, (correct, total))| (area.to_string(), percentage(*correct, *total)))
        .collect();

    let identified_gaps = per_skill_area_proficiency
        .iter()
        .filter(|(_, proficiency)| threshold.is_gap(**proficiency))
        .map(|(area, _)| area.clone())
        .collect();

    Ok(ScoredResult {
        correct_count,
        total_count,
        overall_score: percentage(correct_count, total_count),
        per_skill_area_proficiency,
        identified_gaps,
        question_results,
    })
}

/// `total` is never zero here: every tallied area has at least one question.
fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 * 100.0 / total as f64).round()).clamp(0.0, 100.0) as u8
}
