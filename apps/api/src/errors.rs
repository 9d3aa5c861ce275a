use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::GenerationErrorKind;
use crate::pipelines::PipelineError;
use crate::scoring::ScoringError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(PipelineError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Pipeline(PipelineError::Scoring(e)) => {
                let code = match e {
                    ScoringError::ShapeMismatch(_) => "SHAPE_MISMATCH",
                    ScoringError::EmptyQuiz => "EMPTY_QUIZ",
                };
                (StatusCode::UNPROCESSABLE_ENTITY, code, e.to_string())
            }
            AppError::Pipeline(e @ PipelineError::Failed { reason, .. }) => {
                tracing::error!("Pipeline error: {e}");
                let (status, code) = match reason.kind {
                    GenerationErrorKind::Timeout => {
                        (StatusCode::GATEWAY_TIMEOUT, "GENERATION_TIMEOUT")
                    }
                    GenerationErrorKind::MalformedOutput => {
                        (StatusCode::BAD_GATEWAY, "GENERATION_MALFORMED_OUTPUT")
                    }
                    GenerationErrorKind::UpstreamUnavailable => {
                        (StatusCode::BAD_GATEWAY, "GENERATION_UPSTREAM_UNAVAILABLE")
                    }
                    GenerationErrorKind::InvalidRequest => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "GENERATION_INVALID_REQUEST")
                    }
                };
                (status, code, e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
