//! Answer Scoring Engine: pure, deterministic scoring of submitted answers.
//!
//! No prompt text and no model calls live here. Pipelines score first and then
//! hand the [`ScoredResult`] to prompt builders and the recommendation composer.

pub mod engine;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contracts::quiz::GradedQuiz;

pub use engine::{align, score};

/// Proficiency below this (exclusive) marks a skill area as a gap.
pub const DEFAULT_GAP_THRESHOLD: u8 = 60;

/// Label used for questions the generating stage left without a skill area.
pub const GENERAL_SKILL_AREA: &str = "general";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// Answers do not line up with the quiz (caller error).
    #[error("answers do not match the quiz: {0}")]
    ShapeMismatch(String),

    /// There is nothing to score (caller error).
    #[error("quiz has no questions to score")]
    EmptyQuiz,
}

/// Exclusive-below gap threshold, 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapThreshold(u8);

impl GapThreshold {
    pub fn new(value: u8) -> Option<Self> {
        (value <= 100).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Ties at the threshold are not gaps.
    pub fn is_gap(self, proficiency: u8) -> bool {
        proficiency < self.0
    }
}

impl Default for GapThreshold {
    fn default() -> Self {
        Self(DEFAULT_GAP_THRESHOLD)
    }
}

/// Skill-area label for every question, by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillAreaMap(Vec<String>);

impl SkillAreaMap {
    #[cfg(test)]
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Reads the `skill_area` each graded question was generated with.
    /// Missing or blank labels fall back to [`GENERAL_SKILL_AREA`].
    pub fn from_quiz(quiz: &GradedQuiz) -> Self {
        Self(
            quiz.questions
                .iter()
                .map(|q| match q.skill_area.as_deref().map(str::trim) {
                    Some(label) if !label.is_empty() => label.to_string(),
                    _ => GENERAL_SKILL_AREA.to_string(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// Correctness of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub index: usize,
    pub skill_area: String,
    pub correct: bool,
}

/// Output of [`score`]. Derived per request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub correct_count: usize,
    pub total_count: usize,
    /// `100 * correct_count / total_count`, rounded.
    pub overall_score: u8,
    /// Area label → proficiency (0–100), in first-encountered order.
    pub per_skill_area_proficiency: IndexMap<String, u8>,
    /// Areas below the gap threshold, in first-encountered order.
    pub identified_gaps: Vec<String>,
    pub question_results: Vec<QuestionResult>,
}

impl ScoredResult {
    /// At most `limit` gaps, weakest first. Equal proficiencies keep
    /// first-encountered order.
    pub fn weakest_gaps(&self, limit: usize) -> Vec<(&str, u8)> {
        let mut gaps: Vec<(&str, u8)> = self
            .identified_gaps
            .iter()
            .filter_map(|area| {
                self.per_skill_area_proficiency
                    .get(area)
                    .map(|p| (area.as_str(), *p))
            })
            .collect();
        // sort_by_key is stable
        gaps.sort_by_key(|&(_, proficiency)| proficiency);
        gaps.truncate(limit);
        gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::fixtures;

    fn scored(areas: &[(&str, u8)], threshold: u8) -> ScoredResult {
        let threshold = GapThreshold::new(threshold).unwrap();
        ScoredResult {
            correct_count: 0,
            total_count: 1,
            overall_score: 0,
            per_skill_area_proficiency: areas
                .iter()
                .map(|(a, p)| (a.to_string(), *p))
                .collect(),
            identified_gaps: areas
                .iter()
                .filter(|(_, p)| threshold.is_gap(*p))
                .map(|(a, _)| a.to_string())
                .collect(),
            question_results: vec![],
        }
    }

    #[test]
    fn test_threshold_is_exclusive_below() {
        let t = GapThreshold::default();
        assert!(t.is_gap(59));
        assert!(!t.is_gap(60));
        assert!(!t.is_gap(100));
    }

    #[test]
    fn test_threshold_rejects_values_above_100() {
        assert!(GapThreshold::new(101).is_none());
        assert_eq!(GapThreshold::new(100).map(GapThreshold::value), Some(100));
    }

    #[test]
    fn test_weakest_gaps_ties_keep_first_encountered_order() {
        let result = scored(
            &[("Networking", 40), ("Databases", 20), ("Testing", 40), ("Rust", 20)],
            60,
        );
        let gaps = result.weakest_gaps(10);
        assert_eq!(
            gaps,
            vec![("Databases", 20), ("Rust", 20), ("Networking", 40), ("Testing", 40)]
        );
    }

    #[test]
    fn test_weakest_gaps_truncates_to_limit() {
        let result = scored(&[("A", 50), ("B", 10), ("C", 30)], 60);
        assert_eq!(result.weakest_gaps(2), vec![("B", 10), ("C", 30)]);
        assert!(result.weakest_gaps(0).is_empty());
    }

    #[test]
    fn test_area_map_from_quiz_reads_labels() {
        let map = SkillAreaMap::from_quiz(&fixtures::skill_quiz());
        assert_eq!(map.len(), 3);
        assert_eq!(map.label(0), Some("Rust"));
        assert_eq!(map.label(1), Some("SQL"));
        assert_eq!(map.label(3), None);
    }

    #[test]
    fn test_area_map_falls_back_to_general() {
        let mut quiz = fixtures::skill_quiz();
        quiz.questions[0].skill_area = None;
        quiz.questions[1].skill_area = Some("   ".to_string());
        let map = SkillAreaMap::from_quiz(&quiz);
        assert_eq!(map.label(0), Some(GENERAL_SKILL_AREA));
        assert_eq!(map.label(1), Some(GENERAL_SKILL_AREA));
    }
}
