//! Quiz-stage prompt templates and the pure builders that fill them.
//!
//! Builders are deterministic and side-effect free: the same prior-stage output
//! always yields the same prompt, so pipelines can be replayed from cached stages.

use crate::contracts::answers::{Answer, AnswerSet};
use crate::llm_client::prompts::fill;
use crate::contracts::quiz::{ExploratoryQuiz, GradedQuiz, Question, SelectionMode};
use crate::scoring::{self, ScoredResult, ScoringError};

/// Interest/personality quiz. Replace `{question_count}`.
pub const INTEREST_QUIZ_PROMPT: &str = r#"Design a career interest and personality quiz for a student who is exploring internships.

Write exactly {question_count} questions. Each question must reveal a preference: working style, subjects enjoyed, environments, motivations, or the kinds of problems the student likes solving.

RULES:
1. Every question has 2 to 4 short options.
2. Use "multiple" only when picking several options is natural (e.g. "Which subjects do you enjoy?"); otherwise use "single".
3. There are no right or wrong answers. Do NOT include correct answers.
4. Keep the language friendly and jargon-free."#;

/// Graded technical quiz for a target role. Replace `{desired_job}`, `{question_count}`.
pub const SKILL_QUIZ_PROMPT: &str = r#"Design a technical skills assessment for a candidate applying for the role: {desired_job}

Write exactly {question_count} multiple-choice questions that test the practical skills this role needs.

RULES:
1. Every question has 2 to 4 options and at least one correct answer.
2. Use "single" questions with exactly one correct option for most items; use "multiple" only when several options are genuinely correct.
3. Label every question with a short "skill_area" (e.g. "Databases", "Version control"). Reuse the same label for questions on the same skill; use 3 to 6 distinct areas.
4. Add a one-sentence "explanation" of the correct answer.
5. Vary difficulty from foundational to intermediate. Avoid trick questions."#;

/// Free-text role inference from an interest quiz. Replace `{interest_questions}`.
pub const ROLE_INFERENCE_PROMPT: &str = r#"Below is a career interest quiz a student is about to take.

{interest_questions}

Based on the interests these questions explore, name the single entry-level job role that would make the best starting point for a technical skills assessment.

Respond with the job title only, for example: Junior Data Analyst"#;

/// Trait profile from an answered exploratory quiz. Replace `{transcript}`.
pub const TRAIT_PROFILE_PROMPT: &str = r#"A student answered the career interest quiz below.

{transcript}

Score the student on 4 to 8 personality and interest traits relevant to choosing a career (e.g. Analytical, Creative, Social, Practical, Leadership, Detail-oriented). Scores are integers from 0 to 100.

Write a two or three sentence summary addressed to the student ("You ...")."#;

pub fn build_interest_quiz_prompt(question_count: usize) -> String {
    INTEREST_QUIZ_PROMPT.replace("{question_count}", &question_count.to_string())
}

pub fn build_skill_quiz_prompt(desired_job: &str, question_count: usize) -> String {
    fill(
        SKILL_QUIZ_PROMPT,
        &[
            ("desired_job", desired_job.trim()),
            ("question_count", &question_count.to_string()),
        ],
    )
}

/// Joins the interest quiz's questions and options into the role-inference prompt.
pub fn build_role_inference_prompt(quiz: &ExploratoryQuiz) -> String {
    let listing = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {} ({})", i + 1, q.text.trim(), q.options.join(" / ")))
        .collect::<Vec<_>>()
        .join("\n");
    ROLE_INFERENCE_PROMPT.replace("{interest_questions}", &listing)
}

pub fn build_trait_profile_prompt(
    quiz: &ExploratoryQuiz,
    answers: &AnswerSet,
) -> Result<String, ScoringError> {
    let transcript = exploratory_transcript(quiz, answers)?;
    Ok(TRAIT_PROFILE_PROMPT.replace("{transcript}", &transcript))
}

/// Collapses all whitespace runs to single spaces and trims the ends.
///
/// Role text is free-form and accepted as-is otherwise; there is no closed set
/// of valid roles. Returns `None` only when nothing but whitespace came back.
pub fn normalize_role(raw: &str) -> Option<String> {
    let role = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!role.is_empty()).then_some(role)
}

/// "Q1. text / Answer: option" lines for an answered exploratory quiz.
pub fn exploratory_transcript(
    quiz: &ExploratoryQuiz,
    answers: &AnswerSet,
) -> Result<String, ScoringError> {
    let pairs = scoring::align(&quiz.questions, answers)?;
    Ok(pairs
        .iter()
        .enumerate()
        .map(|(i, (question, answer))| {
            format!(
                "Q{}. {}\nAnswer: {}",
                i + 1,
                question.text.trim(),
                describe_answer(question, answer)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Transcript of a scored graded quiz. Correctness comes from the [`ScoredResult`];
/// nothing is recomputed here.
pub fn graded_transcript(
    quiz: &GradedQuiz,
    answers: &AnswerSet,
    scored: &ScoredResult,
) -> Result<String, ScoringError> {
    let pairs = scoring::align(&quiz.questions, answers)?;
    if scored.question_results.len() != pairs.len() {
        return Err(ScoringError::ShapeMismatch(format!(
            "scored result covers {} questions, quiz has {}",
            scored.question_results.len(),
            pairs.len()
        )));
    }

    Ok(pairs
        .iter()
        .zip(&scored.question_results)
        .map(|((graded, answer), result)| {
            format!(
                "Q{} [{}]. {}\nAnswer: {} ({})",
                result.index + 1,
                result.skill_area,
                graded.question.text.trim(),
                describe_answer(&graded.question, answer),
                if result.correct { "correct" } else { "incorrect" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n"))
}

fn describe_answer(question: &Question, answer: &Answer) -> String {
    if answer.is_skipped() {
        return "(skipped)".to_string();
    }
    let chosen: Vec<&str> = answer
        .selected()
        .into_iter()
        .filter_map(|i| question.options.get(i).map(String::as_str))
        .collect();
    match question.selection_mode {
        SelectionMode::Single => chosen.join(""),
        SelectionMode::Multiple => chosen.join("; "),
    }
}
