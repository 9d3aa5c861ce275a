use crate::pipelines::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
/// The orchestrator holds no per-run state, so one instance serves every request.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}
