//! Generation Gateway: `generate::<T>(prompt)` returns a value that satisfies contract `T`,
//! or a classified [`GenerationError`].
//!
//! The gateway is stateless apart from its shared backend handle and never retries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::contracts::Contract;
use crate::llm_client::prompts::{CONTRACT_INSTRUCTION, FREE_TEXT_SYSTEM, JSON_ONLY_SYSTEM};
use crate::llm_client::{CompletionBackend, LlmError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    /// The call did not finish in time. Transient.
    Timeout,
    /// The output could not be coerced into the contract. Not transient.
    MalformedOutput,
    /// Transport failure or a non-success API status. Transient.
    UpstreamUnavailable,
    /// The prompt was empty; no call was made.
    InvalidRequest,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GenerationErrorKind::Timeout => "timeout",
            GenerationErrorKind::MalformedOutput => "malformed output",
            GenerationErrorKind::UpstreamUnavailable => "upstream unavailable",
            GenerationErrorKind::InvalidRequest => "invalid request",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::MalformedOutput, message)
    }

    /// Timeouts and upstream outages may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            GenerationErrorKind::Timeout | GenerationErrorKind::UpstreamUnavailable
        )
    }
}

impl From<LlmError> for GenerationError {
    fn from(err: LlmError) -> Self {
        let kind = match &err {
            LlmError::Http(e) if e.is_timeout() => GenerationErrorKind::Timeout,
            LlmError::Http(_) | LlmError::Api { .. } => GenerationErrorKind::UpstreamUnavailable,
            LlmError::Timeout(_) => GenerationErrorKind::Timeout,
            LlmError::EmptyContent => GenerationErrorKind::MalformedOutput,
        };
        Self::new(kind, err.to_string())
    }
}

/// Shared handle to the model. Clones share one backend.
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn CompletionBackend>,
    timeout: Duration,
}

impl Gateway {
    pub fn new(backend: Arc<dyn CompletionBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Asks the model for a value of contract `T` and validates it before returning.
    pub async fn generate<T: Contract>(&self, prompt: &str) -> Result<T, GenerationError> {
        ensure_prompt(prompt)?;

        let prompt = format!("{prompt}\n\n{CONTRACT_INSTRUCTION}\n{}", T::SHAPE);
        let text = self.complete(&prompt, JSON_ONLY_SYSTEM).await?;

        let value: T = serde_json::from_str(strip_json_fences(&text)).map_err(|e| {
            GenerationError::malformed(format!("output is not a valid {}: {e}", T::NAME))
        })?;
        value
            .validate()
            .map_err(|violation| GenerationError::malformed(violation.to_string()))?;

        debug!(contract = T::NAME, "Model output satisfied contract");
        Ok(value)
    }

    /// Asks the model for free text. The text is returned as-is; callers normalize it.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        ensure_prompt(prompt)?;
        self.complete(prompt, FREE_TEXT_SYSTEM).await
    }

    async fn complete(&self, prompt: &str, system: &str) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.timeout, self.backend.complete(prompt, system)).await {
            Ok(result) => result.map_err(GenerationError::from),
            Err(_) => Err(LlmError::Timeout(self.timeout).into()),
        }
    }
}

fn ensure_prompt(prompt: &str) -> Result<(), GenerationError> {
    if prompt.trim().is_empty() {
        return Err(GenerationError::new(
            GenerationErrorKind::InvalidRequest,
            "prompt must not be empty",
        ));
    }
    Ok(())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
