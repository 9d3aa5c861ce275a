//! Career pipeline: exploratory interest quiz → trait profile → job roles and courses.
//!
//! Quiz:           1 generate_interest_quiz
//! Recommendation: 1 derive_trait_profile → 2 suggest_career_paths

use tracing::Instrument;
use uuid::Uuid;

use crate::contracts::answers::AnswerSet;
use crate::contracts::outcomes::{CareerRecommendation, TraitProfile};
use crate::contracts::quiz::ExploratoryQuiz;
use crate::contracts::Contract;
use crate::pipelines::prompts::{build_interest_quiz_prompt, build_trait_profile_prompt};
use crate::pipelines::{
    check_question_count, pipeline_span, GeneratedQuiz, Orchestrator, PipelineError,
    PipelineKind, StageId,
};
use crate::recommendation::compose_career;
use crate::scoring::ScoringError;

pub const GENERATE_INTEREST_QUIZ: StageId = StageId::new(1, "generate_interest_quiz");
pub const DERIVE_TRAIT_PROFILE: StageId = StageId::new(1, "derive_trait_profile");
pub const SUGGEST_CAREER_PATHS: StageId = StageId::new(2, "suggest_career_paths");

pub async fn generate_quiz(
    orchestrator: &Orchestrator,
) -> Result<GeneratedQuiz<ExploratoryQuiz>, PipelineError> {
    let run_id = Uuid::new_v4();
    async {
        let count = orchestrator.settings().interest_quiz_questions;
        let prompt = build_interest_quiz_prompt(count);
        let quiz: ExploratoryQuiz = orchestrator
            .run_stage(PipelineKind::Career, GENERATE_INTEREST_QUIZ, &prompt)
            .await?;
        check_question_count(GENERATE_INTEREST_QUIZ, count, quiz.questions.len());
        Ok(GeneratedQuiz::new(run_id, quiz))
    }
    .instrument(pipeline_span(PipelineKind::Career, run_id))
    .await
}

pub async fn score_and_recommend(
    orchestrator: &Orchestrator,
    quiz: &ExploratoryQuiz,
    answers: &AnswerSet,
) -> Result<CareerRecommendation, PipelineError> {
    if quiz.questions.is_empty() {
        return Err(ScoringError::EmptyQuiz.into());
    }
    quiz.validate()?;
    // Alignment is checked while building the transcript, before any model call.
    let prompt = build_trait_profile_prompt(quiz, answers)?;

    let run_id = Uuid::new_v4();
    async {
        let profile: TraitProfile = orchestrator
            .run_stage(PipelineKind::Career, DERIVE_TRAIT_PROFILE, &prompt)
            .await?;
        compose_career(orchestrator, SUGGEST_CAREER_PATHS, profile).await
    }
    .instrument(pipeline_span(PipelineKind::Career, run_id))
    .await
}
