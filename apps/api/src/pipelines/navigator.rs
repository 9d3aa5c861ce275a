//! Career navigator: interest quiz → inferred role → skill quiz for that role,
//! then a combined recommendation once both quizzes are answered.
//!
//! Quiz:           1 generate_interest_quiz → 2 infer_role → 3 generate_skill_quiz
//! Recommendation: (local scoring) → 1 recommend_next_steps
//!
//! The quiz chain is an explicit state machine. Each state holds exactly the
//! validated outputs produced so far, so a run can be resumed from any
//! intermediate state without repeating earlier stages.

use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::contracts::answers::AnswerSet;
use crate::contracts::outcomes::NavigatorRecommendation;
use crate::contracts::quiz::{ExploratoryQuiz, GradedQuiz};
use crate::contracts::Contract;
use crate::llm_client::GenerationError;
use crate::pipelines::prompts::{
    build_interest_quiz_prompt, build_role_inference_prompt, exploratory_transcript,
    normalize_role,
};
use crate::pipelines::skills::generate_skill_quiz;
use crate::pipelines::{
    check_question_count, pipeline_span, GeneratedQuiz, Orchestrator, PipelineError,
    PipelineKind, StageId,
};
use crate::recommendation::compose_navigator;
use crate::scoring::ScoringError;

pub const GENERATE_INTEREST_QUIZ: StageId = StageId::new(1, "generate_interest_quiz");
pub const INFER_ROLE: StageId = StageId::new(2, "infer_role");
pub const GENERATE_SKILL_QUIZ: StageId = StageId::new(3, "generate_skill_quiz");
pub const RECOMMEND_NEXT_STEPS: StageId = StageId::new(1, "recommend_next_steps");

/// Both quizzes of a navigator run plus the role that links them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigatorQuizzes {
    pub inferred_role: String,
    pub interest_quiz: ExploratoryQuiz,
    pub skill_quiz: GradedQuiz,
}

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum NavigatorState {
    Start,
    InterestQuizGenerated {
        interest_quiz: ExploratoryQuiz,
    },
    RoleInferred {
        interest_quiz: ExploratoryQuiz,
        inferred_role: String,
    },
    SkillQuizGenerated {
        interest_quiz: ExploratoryQuiz,
        inferred_role: String,
        skill_quiz: GradedQuiz,
    },
    Done(NavigatorQuizzes),
    Failed(PipelineError),
}

impl NavigatorState {
    pub fn name(&self) -> &'static str {
        match self {
            NavigatorState::Start => "start",
            NavigatorState::InterestQuizGenerated { .. } => "interest_quiz_generated",
            NavigatorState::RoleInferred { .. } => "role_inferred",
            NavigatorState::SkillQuizGenerated { .. } => "skill_quiz_generated",
            NavigatorState::Done(_) => "done",
            NavigatorState::Failed(_) => "failed",
        }
    }

    /// Runs at most one stage and returns the next state. Terminal states are
    /// returned unchanged.
    pub async fn advance(self, orchestrator: &Orchestrator) -> NavigatorState {
        match self {
            NavigatorState::Start => {
                let count = orchestrator.settings().interest_quiz_questions;
                let prompt = build_interest_quiz_prompt(count);
                match orchestrator
                    .run_stage::<ExploratoryQuiz>(
                        PipelineKind::Navigator,
                        GENERATE_INTEREST_QUIZ,
                        &prompt,
                    )
                    .await
                {
                    Ok(interest_quiz) => {
                        check_question_count(
                            GENERATE_INTEREST_QUIZ,
                            count,
                            interest_quiz.questions.len(),
                        );
                        NavigatorState::InterestQuizGenerated { interest_quiz }
                    }
                    Err(e) => NavigatorState::Failed(e),
                }
            }

            NavigatorState::InterestQuizGenerated { interest_quiz } => {
                match infer_role(orchestrator, &interest_quiz).await {
                    Ok(inferred_role) => NavigatorState::RoleInferred {
                        interest_quiz,
                        inferred_role,
                    },
                    Err(e) => NavigatorState::Failed(e),
                }
            }

            NavigatorState::RoleInferred {
                interest_quiz,
                inferred_role,
            } => {
                match generate_skill_quiz(
                    orchestrator,
                    PipelineKind::Navigator,
                    GENERATE_SKILL_QUIZ,
                    &inferred_role,
                )
                .await
                {
                    Ok(skill_quiz) => NavigatorState::SkillQuizGenerated {
                        interest_quiz,
                        inferred_role,
                        skill_quiz,
                    },
                    Err(e) => NavigatorState::Failed(e),
                }
            }

            NavigatorState::SkillQuizGenerated {
                interest_quiz,
                inferred_role,
                skill_quiz,
            } => NavigatorState::Done(NavigatorQuizzes {
                inferred_role,
                interest_quiz,
                skill_quiz,
            }),

            terminal => terminal,
        }
    }
}

async fn infer_role(
    orchestrator: &Orchestrator,
    interest_quiz: &ExploratoryQuiz,
) -> Result<String, PipelineError> {
    let prompt = build_role_inference_prompt(interest_quiz);
    let raw = orchestrator
        .run_text_stage(PipelineKind::Navigator, INFER_ROLE, &prompt)
        .await?;
    let role = normalize_role(&raw).ok_or_else(|| PipelineError::Failed {
        pipeline: PipelineKind::Navigator,
        stage: INFER_ROLE,
        reason: GenerationError::malformed("role inference returned only whitespace"),
    })?;
    debug!(role = %role, "Role inferred");
    Ok(role)
}

/// Drives `state` to a terminal state.
pub async fn run(
    orchestrator: &Orchestrator,
    mut state: NavigatorState,
) -> Result<NavigatorQuizzes, PipelineError> {
    loop {
        state = match state {
            NavigatorState::Done(quizzes) => return Ok(quizzes),
            NavigatorState::Failed(e) => return Err(e),
            pending => {
                let from = pending.name();
                let next = pending.advance(orchestrator).await;
                debug!(from, to = next.name(), "Navigator transition");
                next
            }
        };
    }
}

pub async fn generate_quiz(
    orchestrator: &Orchestrator,
) -> Result<GeneratedQuiz<NavigatorQuizzes>, PipelineError> {
    let run_id = Uuid::new_v4();
    async {
        let quizzes = run(orchestrator, NavigatorState::Start).await?;
        Ok(GeneratedQuiz::new(run_id, quizzes))
    }
    .instrument(pipeline_span(PipelineKind::Navigator, run_id))
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendation
// ────────────────────────────────────────────────────────────────────────────

/// Answers to both quizzes of a navigator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorSubmission {
    pub inferred_role: String,
    pub interest_quiz: ExploratoryQuiz,
    pub interest_answers: AnswerSet,
    pub skill_quiz: GradedQuiz,
    pub skill_answers: AnswerSet,
}

pub async fn score_and_recommend(
    orchestrator: &Orchestrator,
    submission: &NavigatorSubmission,
) -> Result<NavigatorRecommendation, PipelineError> {
    let role = normalize_role(&submission.inferred_role).ok_or_else(|| {
        PipelineError::InvalidInput("inferred_role must not be blank".to_string())
    })?;
    if submission.interest_quiz.questions.is_empty() || submission.skill_quiz.questions.is_empty()
    {
        return Err(ScoringError::EmptyQuiz.into());
    }
    submission.interest_quiz.validate()?;
    submission.skill_quiz.validate()?;

    let interests =
        exploratory_transcript(&submission.interest_quiz, &submission.interest_answers)?;

    let run_id = Uuid::new_v4();
    async {
        let scored = orchestrator.score(&submission.skill_quiz, &submission.skill_answers)?;
        compose_navigator(orchestrator, RECOMMEND_NEXT_STEPS, &role, &interests, &scored).await
    }
    .instrument(pipeline_span(PipelineKind::Navigator, run_id))
    .await
}
