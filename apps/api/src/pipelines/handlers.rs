use axum::{
    extract::{FromRequest, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contracts::answers::AnswerSet;
use crate::contracts::outcomes::{
    CareerRecommendation, NavigatorRecommendation, SkillGapRecommendation, SkillRecommendation,
};
use crate::contracts::quiz::{ExploratoryQuiz, GradedQuiz, Quiz, QuizKind};
use crate::errors::AppError;
use crate::pipelines::navigator::NavigatorSubmission;
use crate::pipelines::skills::SkillContext;
use crate::pipelines::{career, navigator, skill_gaps, skills, GeneratedQuiz};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / response bodies
// ────────────────────────────────────────────────────────────────────────────

/// `Json` extractor whose rejections answer with the `AppError` body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

#[derive(Deserialize)]
pub struct CareerRecommendationRequest {
    pub quiz: Quiz,
    pub answers: AnswerSet,
}

#[derive(Deserialize)]
pub struct SkillRecommendationRequest {
    pub desired_job: String,
    pub quiz: Quiz,
    pub answers: AnswerSet,
}

#[derive(Deserialize)]
pub struct NavigatorRecommendationRequest {
    pub inferred_role: String,
    pub interest_quiz: Quiz,
    pub interest_answers: AnswerSet,
    pub skill_quiz: Quiz,
    pub skill_answers: AnswerSet,
}

#[derive(Serialize)]
pub struct NavigatorQuizResponse {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub inferred_role: String,
    pub interest_quiz: Quiz,
    pub skill_quiz: Quiz,
}

fn tagged<Q: Into<Quiz>>(generated: GeneratedQuiz<Q>) -> GeneratedQuiz<Quiz> {
    GeneratedQuiz {
        run_id: generated.run_id,
        generated_at: generated.generated_at,
        quiz: generated.quiz.into(),
    }
}

fn expect_graded(field: &str, quiz: Quiz) -> Result<GradedQuiz, AppError> {
    quiz.into_graded().map_err(|kind| kind_mismatch(field, QuizKind::Graded, kind))
}

fn expect_exploratory(field: &str, quiz: Quiz) -> Result<ExploratoryQuiz, AppError> {
    quiz.into_exploratory()
        .map_err(|kind| kind_mismatch(field, QuizKind::Exploratory, kind))
}

fn kind_mismatch(field: &str, expected: QuizKind, actual: QuizKind) -> AppError {
    AppError::Validation(format!(
        "`{field}` must be a {expected:?} quiz, got {actual:?}"
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Career
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments/career/quiz
pub async fn handle_career_quiz(
    State(state): State<AppState>,
) -> Result<Json<GeneratedQuiz<Quiz>>, AppError> {
    let generated = career::generate_quiz(&state.orchestrator).await?;
    Ok(Json(tagged(generated)))
}

/// POST /api/v1/assessments/career/recommendation
pub async fn handle_career_recommendation(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CareerRecommendationRequest>,
) -> Result<Json<CareerRecommendation>, AppError> {
    let quiz = expect_exploratory("quiz", req.quiz)?;
    let rec = career::score_and_recommend(&state.orchestrator, &quiz, &req.answers).await?;
    Ok(Json(rec))
}

// ────────────────────────────────────────────────────────────────────────────
// Skills / skill gaps
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments/skills/quiz
pub async fn handle_skills_quiz(
    State(state): State<AppState>,
    ValidJson(context): ValidJson<SkillContext>,
) -> Result<Json<GeneratedQuiz<Quiz>>, AppError> {
    let generated = skills::generate_quiz(&state.orchestrator, &context).await?;
    Ok(Json(tagged(generated)))
}

/// POST /api/v1/assessments/skills/recommendation
pub async fn handle_skills_recommendation(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SkillRecommendationRequest>,
) -> Result<Json<SkillRecommendation>, AppError> {
    let quiz = expect_graded("quiz", req.quiz)?;
    let context = SkillContext::new(req.desired_job);
    let rec = skills::score_and_recommend(&state.orchestrator, &context, &quiz, &req.answers)
        .await?;
    Ok(Json(rec))
}

/// POST /api/v1/assessments/skill-gaps/quiz
pub async fn handle_skill_gaps_quiz(
    State(state): State<AppState>,
    ValidJson(context): ValidJson<SkillContext>,
) -> Result<Json<GeneratedQuiz<Quiz>>, AppError> {
    let generated = skill_gaps::generate_quiz(&state.orchestrator, &context).await?;
    Ok(Json(tagged(generated)))
}

/// POST /api/v1/assessments/skill-gaps/recommendation
pub async fn handle_skill_gaps_recommendation(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SkillRecommendationRequest>,
) -> Result<Json<SkillGapRecommendation>, AppError> {
    let quiz = expect_graded("quiz", req.quiz)?;
    let context = SkillContext::new(req.desired_job);
    let rec =
        skill_gaps::score_and_recommend(&state.orchestrator, &context, &quiz, &req.answers)
            .await?;
    Ok(Json(rec))
}

// ────────────────────────────────────────────────────────────────────────────
// Navigator
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments/navigator/quiz
pub async fn handle_navigator_quiz(
    State(state): State<AppState>,
) -> Result<Json<NavigatorQuizResponse>, AppError> {
    let generated = navigator::generate_quiz(&state.orchestrator).await?;
    Ok(Json(NavigatorQuizResponse {
        run_id: generated.run_id,
        generated_at: generated.generated_at,
        inferred_role: generated.quiz.inferred_role,
        interest_quiz: generated.quiz.interest_quiz.into(),
        skill_quiz: generated.quiz.skill_quiz.into(),
    }))
}

/// POST /api/v1/assessments/navigator/recommendation
pub async fn handle_navigator_recommendation(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<NavigatorRecommendationRequest>,
) -> Result<Json<NavigatorRecommendation>, AppError> {
    let submission = NavigatorSubmission {
        inferred_role: req.inferred_role,
        interest_quiz: expect_exploratory("interest_quiz", req.interest_quiz)?,
        interest_answers: req.interest_answers,
        skill_quiz: expect_graded("skill_quiz", req.skill_quiz)?,
        skill_answers: req.skill_answers,
    };
    let rec = navigator::score_and_recommend(&state.orchestrator, &submission).await?;
    Ok(Json(rec))
}
