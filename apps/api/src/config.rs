use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::pipelines::{PipelineSettings, RetryPolicy};
use crate::scoring::{GapThreshold, DEFAULT_GAP_THRESHOLD};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub llm_timeout: Duration,
    pub stage_max_retries: u32,
    pub gap_threshold: GapThreshold,
    pub interest_quiz_questions: usize,
    pub skill_quiz_questions: usize,
    pub max_prompt_gaps: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let threshold: u8 = parse_env("GAP_THRESHOLD", DEFAULT_GAP_THRESHOLD)?;
        let gap_threshold = GapThreshold::new(threshold)
            .with_context(|| format!("GAP_THRESHOLD must be 0-100, got {threshold}"))?;

        let interest_quiz_questions = parse_env("INTEREST_QUIZ_QUESTIONS", 10)?;
        let skill_quiz_questions = parse_env("SKILL_QUIZ_QUESTIONS", 15)?;
        if interest_quiz_questions == 0 || skill_quiz_questions == 0 {
            bail!("Quiz question counts must be at least 1");
        }

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?),
            stage_max_retries: parse_env("STAGE_MAX_RETRIES", 2)?,
            gap_threshold,
            interest_quiz_questions,
            skill_quiz_questions,
            max_prompt_gaps: parse_env("MAX_PROMPT_GAPS", 5)?,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            interest_quiz_questions: self.interest_quiz_questions,
            skill_quiz_questions: self.skill_quiz_questions,
            gap_threshold: self.gap_threshold,
            max_prompt_gaps: self.max_prompt_gaps,
            retry: RetryPolicy {
                max_retries: self.stage_max_retries,
                ..RetryPolicy::default()
            },
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_value<T>(key: &str, raw: Option<&str>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => s
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_value_uses_default() {
        assert_eq!(parse_value::<u16>("PORT", None, 8080).unwrap(), 8080);
        assert_eq!(parse_value::<u16>("PORT", Some("  "), 8080).unwrap(), 8080);
    }

    #[test]
    fn test_value_is_parsed_and_trimmed() {
        assert_eq!(parse_value::<u32>("STAGE_MAX_RETRIES", Some(" 4 "), 2).unwrap(), 4);
    }

    #[test]
    fn test_invalid_value_names_the_variable() {
        let err = parse_value::<u16>("PORT", Some("eighty"), 8080).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_pipeline_settings_carry_retry_budget() {
        let config = Config {
            anthropic_api_key: "key".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            llm_timeout: Duration::from_secs(120),
            stage_max_retries: 4,
            gap_threshold: GapThreshold::default(),
            interest_quiz_questions: 10,
            skill_quiz_questions: 15,
            max_prompt_gaps: 5,
        };
        let settings = config.pipeline_settings();
        assert_eq!(settings.retry.max_retries, 4);
        assert_eq!(settings.retry.base_delay, Duration::from_millis(1000));
        assert_eq!(settings.skill_quiz_questions, 15);
    }
}
