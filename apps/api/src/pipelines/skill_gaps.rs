//! Skill-gaps pipeline: same graded quiz as the skills pipeline, but the
//! recommendation is organised around the weakest skill areas.
//!
//! Quiz:           1 generate_skill_quiz
//! Recommendation: (local scoring) → 1 recommend_gap_courses

use tracing::Instrument;
use uuid::Uuid;

use crate::contracts::answers::AnswerSet;
use crate::contracts::outcomes::SkillGapRecommendation;
use crate::contracts::quiz::GradedQuiz;
use crate::contracts::Contract;
use crate::pipelines::skills::{generate_skill_quiz, SkillContext, GENERATE_SKILL_QUIZ};
use crate::pipelines::{
    pipeline_span, GeneratedQuiz, Orchestrator, PipelineError, PipelineKind, StageId,
};
use crate::recommendation::compose_skill_gaps;
use crate::scoring::ScoringError;

pub const RECOMMEND_GAP_COURSES: StageId = StageId::new(1, "recommend_gap_courses");

pub async fn generate_quiz(
    orchestrator: &Orchestrator,
    context: &SkillContext,
) -> Result<GeneratedQuiz<GradedQuiz>, PipelineError> {
    context.validate()?;

    let run_id = Uuid::new_v4();
    async {
        let quiz = generate_skill_quiz(
            orchestrator,
            PipelineKind::SkillGaps,
            GENERATE_SKILL_QUIZ,
            &context.desired_job,
        )
        .await?;
        Ok(GeneratedQuiz::new(run_id, quiz))
    }
    .instrument(pipeline_span(PipelineKind::SkillGaps, run_id))
    .await
}

pub async fn score_and_recommend(
    orchestrator: &Orchestrator,
    context: &SkillContext,
    quiz: &GradedQuiz,
    answers: &AnswerSet,
) -> Result<SkillGapRecommendation, PipelineError> {
    context.validate()?;
    if quiz.questions.is_empty() {
        return Err(ScoringError::EmptyQuiz.into());
    }
    quiz.validate()?;

    let run_id = Uuid::new_v4();
    async {
        let scored = orchestrator.score(quiz, answers)?;
        compose_skill_gaps(
            orchestrator,
            RECOMMEND_GAP_COURSES,
            &context.desired_job,
            &scored,
        )
        .await
    }
    .instrument(pipeline_span(PipelineKind::SkillGaps, run_id))
    .await
}
