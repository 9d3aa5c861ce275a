//! Skills pipeline: graded quiz for a desired job → local scoring → course advice.
//!
//! Quiz:           1 generate_skill_quiz
//! Recommendation: (local scoring) → 1 recommend_courses

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::contracts::answers::AnswerSet;
use crate::contracts::outcomes::SkillRecommendation;
use crate::contracts::quiz::GradedQuiz;
use crate::contracts::Contract;
use crate::pipelines::prompts::{build_skill_quiz_prompt, graded_transcript};
use crate::pipelines::{
    check_question_count, pipeline_span, GeneratedQuiz, Orchestrator, PipelineError,
    PipelineKind, StageId,
};
use crate::recommendation::compose_skills;
use crate::scoring::ScoringError;

pub const GENERATE_SKILL_QUIZ: StageId = StageId::new(1, "generate_skill_quiz");
pub const RECOMMEND_COURSES: StageId = StageId::new(1, "recommend_courses");

/// Caller context shared by the skills and skill-gaps pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillContext {
    pub desired_job: String,
}

impl SkillContext {
    pub fn new(desired_job: impl Into<String>) -> Self {
        Self {
            desired_job: desired_job.into(),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.desired_job.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "desired_job must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generates a graded quiz for `desired_job` as one stage of `pipeline`.
/// Shared with the skill-gaps pipeline and the navigator's final quiz stage.
pub(crate) async fn generate_skill_quiz(
    orchestrator: &Orchestrator,
    pipeline: PipelineKind,
    stage: StageId,
    desired_job: &str,
) -> Result<GradedQuiz, PipelineError> {
    let count = orchestrator.settings().skill_quiz_questions;
    let prompt = build_skill_quiz_prompt(desired_job, count);
    let quiz: GradedQuiz = orchestrator.run_stage(pipeline, stage, &prompt).await?;
    check_question_count(stage, count, quiz.questions.len());
    Ok(quiz)
}

pub async fn generate_quiz(
    orchestrator: &Orchestrator,
    context: &SkillContext,
) -> Result<GeneratedQuiz<GradedQuiz>, PipelineError> {
    context.validate()?;

    let run_id = Uuid::new_v4();
    async {
        let quiz = generate_skill_quiz(
            orchestrator,
            PipelineKind::Skills,
            GENERATE_SKILL_QUIZ,
            &context.desired_job,
        )
        .await?;
        Ok(GeneratedQuiz::new(run_id, quiz))
    }
    .instrument(pipeline_span(PipelineKind::Skills, run_id))
    .await
}

pub async fn score_and_recommend(
    orchestrator: &Orchestrator,
    context: &SkillContext,
    quiz: &GradedQuiz,
    answers: &AnswerSet,
) -> Result<SkillRecommendation, PipelineError> {
    context.validate()?;
    if quiz.questions.is_empty() {
        return Err(ScoringError::EmptyQuiz.into());
    }
    quiz.validate()?;

    let run_id = Uuid::new_v4();
    async {
        let scored = orchestrator.score(quiz, answers)?;
        let transcript = graded_transcript(quiz, answers, &scored)?;
        compose_skills(
            orchestrator,
            RECOMMEND_COURSES,
            &context.desired_job,
            &scored,
            &transcript,
        )
        .await
    }
    .instrument(pipeline_span(PipelineKind::Skills, run_id))
    .await
}
