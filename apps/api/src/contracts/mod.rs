//! Contract Registry: the typed shapes exchanged between pipeline stages and callers.
//!
//! A shape is "registered" by implementing [`Contract`]. The gateway only accepts
//! registered shapes: it appends `SHAPE` to the prompt, deserializes the model output
//! into the type, and runs `validate()` before anything downstream sees the value.
//!
//! serde covers required fields and primitive types. `validate()` covers what serde
//! cannot express: option counts, 0–100 score ranges, answer key bounds, non-blank text.

pub mod answers;
pub mod outcomes;
pub mod quiz;

#[cfg(test)]
pub mod fixtures;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Minimum number of options on any question.
pub const MIN_OPTIONS: usize = 2;
/// Maximum number of options on any question.
pub const MAX_OPTIONS: usize = 4;
/// Upper bound (inclusive) for every score field.
pub const MAX_SCORE: u8 = 100;

/// A value failed its contract. `path` points at the offending field, e.g. `questions[2].options`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{contract} violated at `{path}`: {reason}")]
pub struct ContractViolation {
    pub contract: &'static str,
    pub path: String,
    pub reason: String,
}

impl ContractViolation {
    pub fn new(contract: &'static str, path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            contract,
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A structural type the Generation Gateway can be asked to produce.
pub trait Contract: DeserializeOwned + Send + 'static {
    /// Registry name, used in logs and error messages.
    const NAME: &'static str;

    /// Example JSON shape shown to the model. Field names here are the wire names.
    const SHAPE: &'static str;

    /// Checks the constraints serde cannot express.
    fn validate(&self) -> Result<(), ContractViolation>;
}

pub(crate) fn require_text(
    contract: &'static str,
    path: impl Into<String>,
    value: &str,
) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        return Err(ContractViolation::new(contract, path, "must not be blank"));
    }
    Ok(())
}

pub(crate) fn require_score(
    contract: &'static str,
    path: impl Into<String>,
    value: u8,
) -> Result<(), ContractViolation> {
    if value > MAX_SCORE {
        return Err(ContractViolation::new(
            contract,
            path,
            format!("score {value} is outside 0–{MAX_SCORE}"),
        ));
    }
    Ok(())
}

pub(crate) fn require_non_empty<T>(
    contract: &'static str,
    path: impl Into<String>,
    items: &[T],
) -> Result<(), ContractViolation> {
    if items.is_empty() {
        return Err(ContractViolation::new(contract, path, "must not be empty"));
    }
    Ok(())
}
