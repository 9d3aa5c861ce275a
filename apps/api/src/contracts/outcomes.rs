//! Trait profiles, generated advice, and the terminal recommendation objects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::contracts::{
    require_non_empty, require_score, require_text, Contract, ContractViolation,
};

// ────────────────────────────────────────────────────────────────────────────
// Generated shapes
// ────────────────────────────────────────────────────────────────────────────

/// Personality/interest signal derived by the model from an exploratory quiz transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitProfile {
    /// Trait label → score, 0–100 inclusive. Order is the model's.
    pub trait_scores: IndexMap<String, u8>,
    pub summary: String,
}

impl Contract for TraitProfile {
    const NAME: &'static str = "trait_profile";
    const SHAPE: &'static str = r#"{
  "trait_scores": {"Analytical": 82, "Creative": 64, "Social": 40},
  "summary": "You enjoy structured problem solving and prefer working with systems over people."
}
Every trait score is an integer from 0 to 100."#;

    fn validate(&self) -> Result<(), ContractViolation> {
        if self.trait_scores.is_empty() {
            return Err(ContractViolation::new(Self::NAME, "trait_scores", "must not be empty"));
        }
        for (label, score) in &self.trait_scores {
            require_text(Self::NAME, "trait_scores", label)?;
            require_score(Self::NAME, format!("trait_scores.{label}"), *score)?;
        }
        require_text(Self::NAME, "summary", &self.summary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRole {
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub reason: String,
}

fn validate_courses(contract: &'static str, courses: &[Course]) -> Result<(), ContractViolation> {
    require_non_empty(contract, "courses", courses)?;
    for (i, course) in courses.iter().enumerate() {
        require_text(contract, format!("courses[{i}].title"), &course.title)?;
        require_text(contract, format!("courses[{i}].reason"), &course.reason)?;
    }
    Ok(())
}

/// Job roles and courses suggested from a trait profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerSuggestions {
    pub job_roles: Vec<JobRole>,
    pub courses: Vec<Course>,
}

impl Contract for CareerSuggestions {
    const NAME: &'static str = "career_suggestions";
    const SHAPE: &'static str = r#"{
  "job_roles": [
    {"title": "Data Analyst", "reason": "High analytical score and preference for structured work."}
  ],
  "courses": [
    {"title": "Introduction to SQL", "provider": "Coursera", "reason": "Core skill for analyst roles."}
  ]
}
"provider" is optional. Both lists must be non-empty."#;

    fn validate(&self) -> Result<(), ContractViolation> {
        require_non_empty(Self::NAME, "job_roles", &self.job_roles)?;
        for (i, role) in self.job_roles.iter().enumerate() {
            require_text(Self::NAME, format!("job_roles[{i}].title"), &role.title)?;
            require_text(Self::NAME, format!("job_roles[{i}].reason"), &role.reason)?;
        }
        validate_courses(Self::NAME, &self.courses)
    }
}

/// Courses plus an overall rationale, generated from a proficiency report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAdvice {
    pub courses: Vec<Course>,
    pub reasoning: String,
}

impl Contract for CourseAdvice {
    const NAME: &'static str = "course_advice";
    const SHAPE: &'static str = r#"{
  "courses": [
    {"title": "Rust for Backend Engineers", "provider": "Udemy", "reason": "Strengthens the weakest area."}
  ],
  "reasoning": "Your fundamentals are solid; focus next on concurrency and databases."
}
"provider" is optional. "courses" must be non-empty."#;

    fn validate(&self) -> Result<(), ContractViolation> {
        validate_courses(Self::NAME, &self.courses)?;
        require_text(Self::NAME, "reasoning", &self.reasoning)
    }
}

/// Per-gap advice written by the model for the skill-gap pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapNote {
    pub skill_area: String,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapAdvice {
    pub gap_notes: Vec<GapNote>,
    pub courses: Vec<Course>,
    pub reasoning: String,
}

impl Contract for GapAdvice {
    const NAME: &'static str = "gap_advice";
    const SHAPE: &'static str = r#"{
  "gap_notes": [
    {"skill_area": "Databases", "advice": "Practise writing joins and indexing strategies."}
  ],
  "courses": [
    {"title": "Database Design Fundamentals", "provider": "edX", "reason": "Closes the Databases gap."}
  ],
  "reasoning": "Two gaps stand between you and the role; databases is the larger one."
}
Use the exact skill_area labels you were given. "provider" is optional. "courses" must be non-empty."#;

    fn validate(&self) -> Result<(), ContractViolation> {
        for (i, note) in self.gap_notes.iter().enumerate() {
            require_text(Self::NAME, format!("gap_notes[{i}].skill_area"), &note.skill_area)?;
            require_text(Self::NAME, format!("gap_notes[{i}].advice"), &note.advice)?;
        }
        validate_courses(Self::NAME, &self.courses)?;
        require_text(Self::NAME, "reasoning", &self.reasoning)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Terminal recommendations (returned to callers, never sent to the model)
// ────────────────────────────────────────────────────────────────────────────

/// Scored proficiency as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencyReport {
    pub overall_score: u8,
    pub correct_count: usize,
    pub total_count: usize,
    pub per_skill_area_proficiency: IndexMap<String, u8>,
    pub identified_gaps: Vec<String>,
}

/// An identified gap with its proficiency and, when the model wrote one, advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_area: String,
    pub proficiency: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecommendation {
    pub trait_profile: TraitProfile,
    pub job_roles: Vec<JobRole>,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecommendation {
    pub desired_job: String,
    pub proficiency: ProficiencyReport,
    pub courses: Vec<Course>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGapRecommendation {
    pub desired_job: String,
    pub proficiency: ProficiencyReport,
    pub skill_gaps: Vec<SkillGap>,
    pub courses: Vec<Course>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorRecommendation {
    pub inferred_role: String,
    pub proficiency: ProficiencyReport,
    pub skill_gaps: Vec<SkillGap>,
    pub courses: Vec<Course>,
    pub reasoning: String,
}
