//! Quiz contracts: questions, answer keys, and the exploratory/graded quiz variants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::contracts::{
    require_non_empty, require_text, Contract, ContractViolation, MAX_OPTIONS, MIN_OPTIONS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    Multiple,
}

/// A question as the user sees it. Carries no correctness information, so answer
/// key fields on an exploratory question are rejected rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub selection_mode: SelectionMode,
}

impl Question {
    fn validate_at(&self, contract: &'static str, path: &str) -> Result<(), ContractViolation> {
        require_text(contract, format!("{path}.text"), &self.text)?;

        let count = self.options.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
            return Err(ContractViolation::new(
                contract,
                format!("{path}.options"),
                format!("expected {MIN_OPTIONS} to {MAX_OPTIONS} options, got {count}"),
            ));
        }
        for (i, option) in self.options.iter().enumerate() {
            require_text(contract, format!("{path}.options[{i}]"), option)?;
        }
        Ok(())
    }
}

impl AsRef<Question> for Question {
    fn as_ref(&self) -> &Question {
        self
    }
}

/// The correct answer for a graded question. The variant always agrees with the
/// question's `selection_mode`; deserialization rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    Single(usize),
    Multiple(BTreeSet<usize>),
}

impl AnswerKey {
    pub fn selection_mode(&self) -> SelectionMode {
        match self {
            AnswerKey::Single(_) => SelectionMode::Single,
            AnswerKey::Multiple(_) => SelectionMode::Multiple,
        }
    }

    fn indices(&self) -> Vec<usize> {
        match self {
            AnswerKey::Single(index) => vec![*index],
            AnswerKey::Multiple(indices) => indices.iter().copied().collect(),
        }
    }
}

/// A question with a known correct answer, used to measure proficiency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GradedQuestionWire", into = "GradedQuestionWire")]
pub struct GradedQuestion {
    pub question: Question,
    pub key: AnswerKey,
    pub explanation: Option<String>,
    /// Skill-area label assigned by the generating stage, if any.
    pub skill_area: Option<String>,
}

impl GradedQuestion {
    fn validate_at(&self, contract: &'static str, path: &str) -> Result<(), ContractViolation> {
        self.question.validate_at(contract, path)?;

        if self.key.selection_mode() != self.question.selection_mode {
            return Err(ContractViolation::new(
                contract,
                format!("{path}.selection_mode"),
                "answer key does not match the selection mode",
            ));
        }

        let option_count = self.question.options.len();
        let (field, indices) = match &self.key {
            AnswerKey::Single(_) => ("correct_option_index", self.key.indices()),
            AnswerKey::Multiple(_) => ("correct_option_indices", self.key.indices()),
        };
        if let Some(bad) = indices.iter().find(|&&i| i >= option_count) {
            return Err(ContractViolation::new(
                contract,
                format!("{path}.{field}"),
                format!("index {bad} is out of range for {option_count} options"),
            ));
        }
        Ok(())
    }
}

impl AsRef<Question> for GradedQuestion {
    fn as_ref(&self) -> &Question {
        &self.question
    }
}

/// Flat wire form of a graded question, exactly as the model and callers send it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GradedQuestionWire {
    text: String,
    options: Vec<String>,
    selection_mode: SelectionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct_option_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct_option_indices: Option<BTreeSet<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skill_area: Option<String>,
}

impl TryFrom<GradedQuestionWire> for GradedQuestion {
    type Error = String;

    fn try_from(wire: GradedQuestionWire) -> Result<Self, Self::Error> {
        let key = match (
            wire.selection_mode,
            wire.correct_option_index,
            wire.correct_option_indices,
        ) {
            (SelectionMode::Single, Some(index), None) => AnswerKey::Single(index),
            (SelectionMode::Single, _, _) => {
                return Err(
                    "single-select question needs exactly `correct_option_index`".to_string(),
                )
            }
            (SelectionMode::Multiple, None, Some(indices)) if !indices.is_empty() => {
                AnswerKey::Multiple(indices)
            }
            (SelectionMode::Multiple, _, _) => {
                return Err(
                    "multiple-select question needs a non-empty `correct_option_indices`"
                        .to_string(),
                )
            }
        };

        Ok(GradedQuestion {
            question: Question {
                text: wire.text,
                options: wire.options,
                selection_mode: wire.selection_mode,
            },
            key,
            explanation: wire.explanation,
            skill_area: wire.skill_area,
        })
    }
}

impl From<GradedQuestion> for GradedQuestionWire {
    fn from(graded: GradedQuestion) -> Self {
        let (correct_option_index, correct_option_indices) = match graded.key {
            AnswerKey::Single(index) => (Some(index), None),
            AnswerKey::Multiple(indices) => (None, Some(indices)),
        };
        GradedQuestionWire {
            text: graded.question.text,
            options: graded.question.options,
            selection_mode: graded.question.selection_mode,
            correct_option_index,
            correct_option_indices,
            explanation: graded.explanation,
            skill_area: graded.skill_area,
        }
    }
}

/// Quiz with no correct answers, used to elicit preference signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploratoryQuiz {
    pub questions: Vec<Question>,
}

/// Quiz with correct answers, used to measure proficiency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedQuiz {
    pub questions: Vec<GradedQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    Exploratory,
    Graded,
}

/// A quiz as carried across the caller boundary, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Quiz {
    Exploratory(ExploratoryQuiz),
    Graded(GradedQuiz),
}

impl Quiz {
    pub fn kind(&self) -> QuizKind {
        match self {
            Quiz::Exploratory(_) => QuizKind::Exploratory,
            Quiz::Graded(_) => QuizKind::Graded,
        }
    }

    /// Returns the graded quiz, or the actual kind if this is not one.
    pub fn into_graded(self) -> Result<GradedQuiz, QuizKind> {
        match self {
            Quiz::Graded(quiz) => Ok(quiz),
            other => Err(other.kind()),
        }
    }

    /// Returns the exploratory quiz, or the actual kind if this is not one.
    pub fn into_exploratory(self) -> Result<ExploratoryQuiz, QuizKind> {
        match self {
            Quiz::Exploratory(quiz) => Ok(quiz),
            other => Err(other.kind()),
        }
    }
}

impl From<ExploratoryQuiz> for Quiz {
    fn from(quiz: ExploratoryQuiz) -> Self {
        Quiz::Exploratory(quiz)
    }
}

impl From<GradedQuiz> for Quiz {
    fn from(quiz: GradedQuiz) -> Self {
        Quiz::Graded(quiz)
    }
}

impl Contract for ExploratoryQuiz {
    const NAME: &'static str = "exploratory_quiz";
    const SHAPE: &'static str = r#"{
  "questions": [
    {
      "text": "Which kind of work energises you most?",
      "options": ["Building things", "Helping people", "Analysing data", "Leading teams"],
      "selection_mode": "single"
    }
  ]
}
Every question has 2 to 4 options. "selection_mode" is "single" or "multiple". There are NO correct answers."#;

    fn validate(&self) -> Result<(), ContractViolation> {
        require_non_empty(Self::NAME, "questions", &self.questions)?;
        for (i, question) in self.questions.iter().enumerate() {
            question.validate_at(Self::NAME, &format!("questions[{i}]"))?;
        }
        Ok(())
    }
}

impl Contract for GradedQuiz {
    const NAME: &'static str = "graded_quiz";
    const SHAPE: &'static str = r#"{
  "questions": [
    {
      "text": "Which HTTP status code means the resource was not found?",
      "options": ["200", "301", "404", "500"],
      "selection_mode": "single",
      "correct_option_index": 2,
      "explanation": "404 Not Found is returned when the server cannot find the resource.",
      "skill_area": "Web fundamentals"
    },
    {
      "text": "Which of these are relational databases?",
      "options": ["PostgreSQL", "Redis", "MySQL", "Kafka"],
      "selection_mode": "multiple",
      "correct_option_indices": [0, 2],
      "explanation": "PostgreSQL and MySQL are relational; Redis and Kafka are not.",
      "skill_area": "Databases"
    }
  ]
}
Every question has 2 to 4 options. Option indices are 0-based.
"single" questions carry exactly "correct_option_index". "multiple" questions carry a non-empty "correct_option_indices"."#;

    fn validate(&self) -> Result<(), ContractViolation> {
        require_non_empty(Self::NAME, "questions", &self.questions)?;
        for (i, question) in self.questions.iter().enumerate() {
            question.validate_at(Self::NAME, &format!("questions[{i}]"))?;
        }
        Ok(())
    }
}
