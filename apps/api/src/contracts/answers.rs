use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::contracts::quiz::SelectionMode;

/// One submitted response. Position in the [`AnswerSet`] identifies the question.
///
/// A skipped question still occupies its slot: `selected_option_index: null` for
/// single-select, an empty `selected_option_indices` for multiple-select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "selection_mode", rename_all = "snake_case")]
pub enum Answer {
    Single {
        #[serde(default)]
        selected_option_index: Option<usize>,
    },
    Multiple {
        #[serde(default)]
        selected_option_indices: BTreeSet<usize>,
    },
}

impl Answer {
    #[cfg(test)]
    pub fn single(index: usize) -> Self {
        Answer::Single {
            selected_option_index: Some(index),
        }
    }

    #[cfg(test)]
    pub fn multiple(indices: impl IntoIterator<Item = usize>) -> Self {
        Answer::Multiple {
            selected_option_indices: indices.into_iter().collect(),
        }
    }

    #[cfg(test)]
    pub fn skipped(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => Answer::Single {
                selected_option_index: None,
            },
            SelectionMode::Multiple => Answer::Multiple {
                selected_option_indices: BTreeSet::new(),
            },
        }
    }

    pub fn selection_mode(&self) -> SelectionMode {
        match self {
            Answer::Single { .. } => SelectionMode::Single,
            Answer::Multiple { .. } => SelectionMode::Multiple,
        }
    }

    pub fn is_skipped(&self) -> bool {
        match self {
            Answer::Single {
                selected_option_index,
            } => selected_option_index.is_none(),
            Answer::Multiple {
                selected_option_indices,
            } => selected_option_indices.is_empty(),
        }
    }

    /// Selected option indices in ascending order.
    pub fn selected(&self) -> Vec<usize> {
        match self {
            Answer::Single {
                selected_option_index,
            } => selected_option_index.iter().copied().collect(),
            Answer::Multiple {
                selected_option_indices,
            } => selected_option_indices.iter().copied().collect(),
        }
    }
}

/// Ordered answers, one per question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    pub answers: Vec<Answer>,
}

impl AnswerSet {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Answer> {
        self.answers.iter()
    }
}

impl FromIterator<Answer> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = Answer>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
