// Recommendation-stage prompt templates and builders.
// Scores and gaps are rendered from already-computed values; no scoring happens here.

use crate::contracts::outcomes::TraitProfile;
use crate::llm_client::prompts::fill;
use crate::scoring::ScoredResult;

/// Replace: {trait_scores}, {summary}
pub const CAREER_PATHS_PROMPT: &str = r#"A student's career interest profile:

TRAIT SCORES (0-100):
{trait_scores}

SUMMARY:
{summary}

Suggest 3 to 5 entry-level job roles or internships that fit this profile, strongest fit first, each with a one-sentence reason tied to the trait scores.
Then suggest 3 to 5 beginner-friendly online courses that would help the student move toward those roles."#;

/// Replace: {desired_job}, {overall_score}, {proficiency}, {gaps}, {transcript}
pub const COURSE_PROMPT: &str = r#"A candidate took a technical assessment for the role: {desired_job}

OVERALL SCORE: {overall_score}/100

PROFICIENCY BY SKILL AREA:
{proficiency}

SKILL AREAS BELOW TARGET:
{gaps}

QUESTION-BY-QUESTION RESULTS:
{transcript}

Recommend 3 to 5 online courses that would most improve this candidate's readiness for the role, prioritising the weakest areas.
Explain your reasoning in two to four sentences addressed to the candidate."#;

/// Replace: {desired_job}, {proficiency}, {gaps}
pub const GAP_COURSE_PROMPT: &str = r#"A candidate took a technical assessment for the role: {desired_job}

PROFICIENCY BY SKILL AREA:
{proficiency}

SKILL GAPS, WEAKEST FIRST:
{gaps}

For each skill gap listed above, write one "gap_notes" entry with concrete practice advice. Use the skill_area labels exactly as written.
Then recommend 3 to 5 online courses that close these gaps, and explain in two to four sentences how to prioritise them."#;

/// Replace: {inferred_role}, {interests}, {proficiency}, {gaps}
pub const NEXT_STEPS_PROMPT: &str = r#"A student explored their career interests and was matched to the role: {inferred_role}

THEIR INTEREST QUIZ ANSWERS:
{interests}

THEIR TECHNICAL ASSESSMENT FOR THAT ROLE:
{proficiency}

SKILL GAPS, WEAKEST FIRST:
{gaps}

Recommend 3 to 5 online courses that build toward {inferred_role}, starting with the weakest areas.
Explain in two to four sentences why this role suits their interests and what to focus on next."#;

const NO_GAPS: &str = "None. Every skill area met the target.";

pub fn build_career_paths_prompt(profile: &TraitProfile) -> String {
    let traits = profile
        .trait_scores
        .iter()
        .map(|(label, score)| format!("- {label}: {score}"))
        .collect::<Vec<_>>()
        .join("\n");
    fill(
        CAREER_PATHS_PROMPT,
        &[("trait_scores", &traits), ("summary", profile.summary.trim())],
    )
}

pub fn build_course_prompt(
    desired_job: &str,
    scored: &ScoredResult,
    transcript: &str,
    max_gaps: usize,
) -> String {
    fill(
        COURSE_PROMPT,
        &[
            ("desired_job", desired_job.trim()),
            ("overall_score", &scored.overall_score.to_string()),
            ("proficiency", &format_proficiency(scored)),
            ("gaps", &format_gaps(scored, max_gaps)),
            ("transcript", transcript),
        ],
    )
}

pub fn build_gap_course_prompt(desired_job: &str, scored: &ScoredResult, max_gaps: usize) -> String {
    fill(
        GAP_COURSE_PROMPT,
        &[
            ("desired_job", desired_job.trim()),
            ("proficiency", &format_proficiency(scored)),
            ("gaps", &format_gaps(scored, max_gaps)),
        ],
    )
}

pub fn build_next_steps_prompt(
    inferred_role: &str,
    interests: &str,
    scored: &ScoredResult,
    max_gaps: usize,
) -> String {
    fill(
        NEXT_STEPS_PROMPT,
        &[
            ("inferred_role", inferred_role),
            ("interests", interests),
            ("proficiency", &format_proficiency(scored)),
            ("gaps", &format_gaps(scored, max_gaps)),
        ],
    )
}

fn format_proficiency(scored: &ScoredResult) -> String {
    scored
        .per_skill_area_proficiency
        .iter()
        .map(|(area, proficiency)| format!("- {area}: {proficiency}%"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_gaps(scored: &ScoredResult, max_gaps: usize) -> String {
    let gaps = scored.weakest_gaps(max_gaps);
    if gaps.is_empty() {
        return NO_GAPS.to_string();
    }
    gaps.iter()
        .map(|(area, proficiency)| format!("- {area} ({proficiency}%)"))
        .collect::<Vec<_>>()
        .join("\n")
}
