//! Stage Orchestrator: sequences gateway calls where each stage's prompt is built
//! from the previous stage's validated output.
//!
//! Every stage either hands a validated value forward or the whole pipeline returns
//! [`PipelineError::Failed`] naming the stage. No partial result is ever returned:
//! intermediate values live only in locals until the final value is built, so a
//! dropped (cancelled) pipeline future yields nothing.

pub mod career;
pub mod handlers;
pub mod navigator;
pub mod prompts;
pub mod skill_gaps;
pub mod skills;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::contracts::answers::AnswerSet;
use crate::contracts::quiz::GradedQuiz;
use crate::contracts::{Contract, ContractViolation};
use crate::llm_client::{Gateway, GenerationError};
use crate::scoring::{self, GapThreshold, ScoredResult, ScoringError, SkillAreaMap};

// ────────────────────────────────────────────────────────────────────────────
// Identity and errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    Career,
    Skills,
    SkillGaps,
    Navigator,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineKind::Career => "career",
            PipelineKind::Skills => "skills",
            PipelineKind::SkillGaps => "skill_gaps",
            PipelineKind::Navigator => "navigator",
        };
        f.write_str(label)
    }
}

/// One bounded unit of work. Ordinals are 1-based within an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageId {
    pub ordinal: u8,
    pub name: &'static str,
}

impl StageId {
    pub const fn new(ordinal: u8, name: &'static str) -> Self {
        Self { ordinal, name }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ordinal, self.name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{pipeline} pipeline failed at stage {stage}: {reason}")]
    Failed {
        pipeline: PipelineKind,
        stage: StageId,
        reason: GenerationError,
    },

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<ContractViolation> for PipelineError {
    fn from(violation: ContractViolation) -> Self {
        PipelineError::InvalidInput(violation.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Settings
// ────────────────────────────────────────────────────────────────────────────

/// Bounded retries for transient stage failures (`Timeout`, `UpstreamUnavailable`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Exponential backoff: base, 2×base, 4×base, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub interest_quiz_questions: usize,
    pub skill_quiz_questions: usize,
    pub gap_threshold: GapThreshold,
    /// How many of the weakest gaps are named in recommendation prompts.
    pub max_prompt_gaps: usize,
    pub retry: RetryPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            interest_quiz_questions: 10,
            skill_quiz_questions: 15,
            gap_threshold: GapThreshold::default(),
            max_prompt_gaps: 5,
            retry: RetryPolicy::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared output envelope
// ────────────────────────────────────────────────────────────────────────────

/// A freshly generated quiz plus the identifiers of the run that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuiz<Q> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub quiz: Q,
}

impl<Q> GeneratedQuiz<Q> {
    pub fn new(run_id: Uuid, quiz: Q) -> Self {
        Self {
            run_id,
            generated_at: Utc::now(),
            quiz,
        }
    }
}

/// The model is asked for an exact count but the contract only requires a
/// non-empty quiz, so a short or long quiz is logged rather than rejected.
pub(crate) fn check_question_count(stage: StageId, requested: usize, generated: usize) {
    if requested != generated {
        warn!(
            "Stage {} asked for {} questions and got {}",
            stage, requested, generated
        );
    }
}

/// Span wrapping one pipeline operation so every stage log carries the run id.
pub(crate) fn pipeline_span(kind: PipelineKind, run_id: Uuid) -> tracing::Span {
    tracing::info_span!("pipeline", kind = %kind, run_id = %run_id)
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

/// Stateless across invocations; clone freely and share between requests.
#[derive(Clone)]
pub struct Orchestrator {
    gateway: Gateway,
    settings: PipelineSettings,
}

impl Orchestrator {
    pub fn new(gateway: Gateway, settings: PipelineSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs one contract-bound stage.
    pub async fn run_stage<T: Contract>(
        &self,
        pipeline: PipelineKind,
        stage: StageId,
        prompt: &str,
    ) -> Result<T, PipelineError> {
        self.with_retries(pipeline, stage, || self.gateway.generate::<T>(prompt))
            .await
    }

    /// Runs one free-text stage. The raw text is returned; callers normalize it.
    pub async fn run_text_stage(
        &self,
        pipeline: PipelineKind,
        stage: StageId,
        prompt: &str,
    ) -> Result<String, PipelineError> {
        self.with_retries(pipeline, stage, || self.gateway.generate_text(prompt))
            .await
    }

    /// Scores a graded quiz with labels taken from its own questions.
    pub fn score(&self, quiz: &GradedQuiz, answers: &AnswerSet) -> Result<ScoredResult, PipelineError> {
        let areas = SkillAreaMap::from_quiz(quiz);
        let scored = scoring::score(quiz, answers, &areas, self.settings.gap_threshold)?;
        info!(
            correct = scored.correct_count,
            total = scored.total_count,
            overall = scored.overall_score,
            gaps = scored.identified_gaps.len(),
            "Answers scored"
        );
        Ok(scored)
    }

    async fn with_retries<T, F, Fut>(
        &self,
        pipeline: PipelineKind,
        stage: StageId,
        mut call: F,
    ) -> Result<T, PipelineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let policy = self.settings.retry;
        let mut retries = 0;

        info!(stage = stage.name, ordinal = stage.ordinal, "Stage started");

        loop {
            match call().await {
                Ok(value) => {
                    info!(stage = stage.name, ordinal = stage.ordinal, "Stage succeeded");
                    return Ok(value);
                }
                Err(reason) if reason.is_transient() && retries < policy.max_retries => {
                    retries += 1;
                    let delay = policy.delay_for(retries);
                    warn!(
                        "Stage {} attempt {} failed ({}), retrying after {}ms...",
                        stage,
                        retries,
                        reason,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(reason) => {
                    error!(%pipeline, "Stage {} failed: {}", stage, reason);
                    return Err(PipelineError::Failed {
                        pipeline,
                        stage,
                        reason,
                    });
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{orchestrator, orchestrator_with};
    use super::*;
    use crate::contracts::fixtures;
    use crate::contracts::outcomes::TraitProfile;
    use crate::llm_client::scripted::ScriptedBackend;
    use crate::llm_client::{GenerationErrorKind, LlmError};
    use std::sync::Arc;

    const STAGE: StageId = StageId::new(1, "derive_trait_profile");

    fn overloaded() -> LlmError {
        LlmError::Api {
            status: 529,
            message: "overloaded".to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_failed_error_names_pipeline_and_stage() {
        let err = PipelineError::Failed {
            pipeline: PipelineKind::Navigator,
            stage: StageId::new(2, "infer_role"),
            reason: GenerationError::malformed("bad"),
        };
        assert_eq!(
            err.to_string(),
            "navigator pipeline failed at stage 2 (infer_role): malformed output: bad"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried_within_budget() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .fail(overloaded())
                .fail(overloaded())
                .reply_json(fixtures::trait_profile_json()),
        );
        let orch = orchestrator_with(&backend, RetryPolicy::default());

        let profile: TraitProfile = orch
            .run_stage(PipelineKind::Career, STAGE, "profile")
            .await
            .unwrap();
        assert_eq!(profile.trait_scores.len(), 3);
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_exhaustion_fails_stage() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .fail(overloaded())
                .fail(overloaded())
                .fail(overloaded()),
        );
        let orch = orchestrator_with(&backend, RetryPolicy::default());

        let err = orch
            .run_stage::<TraitProfile>(PipelineKind::Career, STAGE, "profile")
            .await
            .unwrap_err();
        match err {
            PipelineError::Failed { stage, reason, .. } => {
                assert_eq!(stage, STAGE);
                assert_eq!(reason.kind, GenerationErrorKind::UpstreamUnavailable);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_output_is_never_retried() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply("not json")
                .reply_json(fixtures::trait_profile_json()),
        );
        let orch = orchestrator_with(&backend, RetryPolicy::default());

        let err = orch
            .run_stage::<TraitProfile>(PipelineKind::Career, STAGE, "profile")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Failed { reason, .. } if reason.kind == GenerationErrorKind::MalformedOutput
        ));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_score_uses_configured_threshold() {
        let backend = Arc::new(ScriptedBackend::new());
        let orch = orchestrator(&backend);
        let quiz = fixtures::skill_quiz();
        let answers = AnswerSet::new(vec![
            crate::contracts::answers::Answer::single(1),
            crate::contracts::answers::Answer::multiple([0]),
            crate::contracts::answers::Answer::single(0),
        ]);
        let scored = orch.score(&quiz, &answers).unwrap();
        assert_eq!(scored.identified_gaps, vec!["SQL".to_string()]);
        assert_eq!(backend.calls(), 0);
    }
}
