pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipelines::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Career
        .route(
            "/api/v1/assessments/career/quiz",
            post(handlers::handle_career_quiz),
        )
        .route(
            "/api/v1/assessments/career/recommendation",
            post(handlers::handle_career_recommendation),
        )
        // Skills
        .route(
            "/api/v1/assessments/skills/quiz",
            post(handlers::handle_skills_quiz),
        )
        .route(
            "/api/v1/assessments/skills/recommendation",
            post(handlers::handle_skills_recommendation),
        )
        // Skill gaps
        .route(
            "/api/v1/assessments/skill-gaps/quiz",
            post(handlers::handle_skill_gaps_quiz),
        )
        .route(
            "/api/v1/assessments/skill-gaps/recommendation",
            post(handlers::handle_skill_gaps_recommendation),
        )
        // Navigator
        .route(
            "/api/v1/assessments/navigator/quiz",
            post(handlers::handle_navigator_quiz),
        )
        .route(
            "/api/v1/assessments/navigator/recommendation",
            post(handlers::handle_navigator_recommendation),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::fixtures;
    use crate::llm_client::scripted::ScriptedBackend;
    use crate::llm_client::LlmError;
    use crate::pipelines::test_support::orchestrator;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(backend: &Arc<ScriptedBackend>) -> Router {
        build_router(AppState {
            orchestrator: orchestrator(backend),
        })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn tagged(kind: &str, mut quiz: Value) -> Value {
        quiz["kind"] = json!(kind);
        quiz
    }

    #[tokio::test]
    async fn test_health() {
        let backend = Arc::new(ScriptedBackend::new());
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = app(&backend).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_skills_quiz_returns_tagged_quiz_with_run_id() {
        let backend = Arc::new(ScriptedBackend::new().reply_json(fixtures::skill_quiz_json()));
        let (status, body) = post_json(
            app(&backend),
            "/api/v1/assessments/skills/quiz",
            json!({"desired_job": "Backend Engineer"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["run_id"].is_string());
        assert!(body["generated_at"].is_string());
        assert_eq!(body["quiz"]["kind"], "graded");
        assert_eq!(body["quiz"]["questions"][1]["correct_option_indices"], json!([0, 2]));
    }

    #[tokio::test]
    async fn test_blank_desired_job_is_bad_request() {
        let backend = Arc::new(ScriptedBackend::new());
        let (status, body) = post_json(
            app(&backend),
            "/api/v1/assessments/skill-gaps/quiz",
            json!({"desired_job": "   "}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_quiz_kind_is_bad_request() {
        let backend = Arc::new(ScriptedBackend::new());
        let (status, body) = post_json(
            app(&backend),
            "/api/v1/assessments/skills/recommendation",
            json!({
                "desired_job": "Backend Engineer",
                "quiz": tagged("exploratory", fixtures::interest_quiz_json()),
                "answers": []
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_short_answer_set_is_shape_mismatch() {
        let backend = Arc::new(ScriptedBackend::new());
        let (status, body) = post_json(
            app(&backend),
            "/api/v1/assessments/skills/recommendation",
            json!({
                "desired_job": "Backend Engineer",
                "quiz": tagged("graded", fixtures::skill_quiz_json()),
                "answers": [
                    {"selection_mode": "single", "selected_option_index": 1}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "SHAPE_MISMATCH");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_skills_recommendation_end_to_end() {
        let backend = Arc::new(ScriptedBackend::new().reply_json(fixtures::course_advice_json()));
        let (status, body) = post_json(
            app(&backend),
            "/api/v1/assessments/skills/recommendation",
            json!({
                "desired_job": "Backend Engineer",
                "quiz": tagged("graded", fixtures::skill_quiz_json()),
                "answers": [
                    {"selection_mode": "single", "selected_option_index": 1},
                    {"selection_mode": "multiple", "selected_option_indices": [2, 0]},
                    {"selection_mode": "single"}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["proficiency"]["correct_count"], 2);
        assert_eq!(body["proficiency"]["per_skill_area_proficiency"]["Rust"], 50);
        assert_eq!(body["proficiency"]["identified_gaps"], json!(["Rust"]));
        assert_eq!(body["courses"][0]["title"], "SQL Deep Dive");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway_naming_stage() {
        let backend = Arc::new(ScriptedBackend::new().fail(LlmError::Api {
            status: 500,
            message: "internal".to_string(),
        }));
        let (status, body) =
            post_json(app(&backend), "/api/v1/assessments/career/quiz", json!({})).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_UPSTREAM_UNAVAILABLE");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("stage 1 (generate_interest_quiz)"));
    }

    #[tokio::test]
    async fn test_navigator_quiz_returns_both_quizzes() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .reply_json(fixtures::interest_quiz_json())
                .reply("Junior Data Analyst")
                .reply_json(fixtures::skill_quiz_json()),
        );
        let (status, body) =
            post_json(app(&backend), "/api/v1/assessments/navigator/quiz", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["inferred_role"], "Junior Data Analyst");
        assert_eq!(body["interest_quiz"]["kind"], "exploratory");
        assert_eq!(body["skill_quiz"]["kind"], "graded");
    }

    #[tokio::test]
    async fn test_graded_question_without_key_is_validation_error() {
        let backend = Arc::new(ScriptedBackend::new());
        let (status, body) = post_json(
            app(&backend),
            "/api/v1/assessments/skills/recommendation",
            json!({
                "desired_job": "Backend Engineer",
                "quiz": {
                    "kind": "graded",
                    "questions": [{"text": "q", "options": ["a", "b"], "selection_mode": "single"}]
                },
                "answers": []
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_exploratory_question_with_answer_key_is_validation_error() {
        let backend = Arc::new(ScriptedBackend::new());
        let (status, body) = post_json(
            app(&backend),
            "/api/v1/assessments/career/recommendation",
            json!({
                "quiz": {
                    "kind": "exploratory",
                    "questions": [{
                        "text": "Pick one",
                        "options": ["a", "b"],
                        "selection_mode": "single",
                        "correct_option_index": 0
                    }]
                },
                "answers": [{"selection_mode": "single", "selected_option_index": 0}]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(backend.calls(), 0);
    }
}
