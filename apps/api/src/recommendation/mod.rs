//! Recommendation Composer: the terminal stage of every pipeline.
//!
//! Scored values map straight onto report fields (no model call). Courses, roles
//! and reasoning come from one final gateway stage whose errors propagate unchanged.

pub mod prompts;

use tracing::debug;

use crate::contracts::outcomes::{
    CareerRecommendation, CareerSuggestions, CourseAdvice, GapAdvice, GapNote,
    NavigatorRecommendation, ProficiencyReport, SkillGap, SkillGapRecommendation,
    SkillRecommendation, TraitProfile,
};
use crate::pipelines::{Orchestrator, PipelineError, PipelineKind, StageId};
use crate::recommendation::prompts::{
    build_career_paths_prompt, build_course_prompt, build_gap_course_prompt,
    build_next_steps_prompt,
};
use crate::scoring::ScoredResult;

// ────────────────────────────────────────────────────────────────────────────
// Direct mapping
// ────────────────────────────────────────────────────────────────────────────

impl From<&ScoredResult> for ProficiencyReport {
    fn from(scored: &ScoredResult) -> Self {
        ProficiencyReport {
            overall_score: scored.overall_score,
            correct_count: scored.correct_count,
            total_count: scored.total_count,
            per_skill_area_proficiency: scored.per_skill_area_proficiency.clone(),
            identified_gaps: scored.identified_gaps.clone(),
        }
    }
}

/// Every identified gap, weakest first, with any matching model advice attached.
/// Notes match on skill area ignoring case and surrounding whitespace; notes for
/// areas that are not gaps are dropped.
pub fn skill_gaps(scored: &ScoredResult, notes: &[GapNote]) -> Vec<SkillGap> {
    let gaps: Vec<SkillGap> = scored
        .weakest_gaps(scored.identified_gaps.len())
        .into_iter()
        .map(|(area, proficiency)| SkillGap {
            skill_area: area.to_string(),
            proficiency,
            advice: notes
                .iter()
                .find(|note| note.skill_area.trim().eq_ignore_ascii_case(area))
                .map(|note| note.advice.trim().to_string()),
        })
        .collect();

    let unmatched = notes
        .len()
        .saturating_sub(gaps.iter().filter(|g| g.advice.is_some()).count());
    if unmatched > 0 {
        debug!(unmatched, "Dropped gap notes for areas that are not gaps");
    }
    gaps
}

// ────────────────────────────────────────────────────────────────────────────
// Generative composition
// ────────────────────────────────────────────────────────────────────────────

pub async fn compose_career(
    orchestrator: &Orchestrator,
    stage: StageId,
    trait_profile: TraitProfile,
) -> Result<CareerRecommendation, PipelineError> {
    let prompt = build_career_paths_prompt(&trait_profile);
    let suggestions: CareerSuggestions = orchestrator
        .run_stage(PipelineKind::Career, stage, &prompt)
        .await?;

    Ok(CareerRecommendation {
        trait_profile,
        job_roles: suggestions.job_roles,
        courses: suggestions.courses,
    })
}

pub async fn compose_skills(
    orchestrator: &Orchestrator,
    stage: StageId,
    desired_job: &str,
    scored: &ScoredResult,
    transcript: &str,
) -> Result<SkillRecommendation, PipelineError> {
    let max_gaps = orchestrator.settings().max_prompt_gaps;
    let prompt = build_course_prompt(desired_job, scored, transcript, max_gaps);
    let advice: CourseAdvice = orchestrator
        .run_stage(PipelineKind::Skills, stage, &prompt)
        .await?;

    Ok(SkillRecommendation {
        desired_job: desired_job.trim().to_string(),
        proficiency: ProficiencyReport::from(scored),
        courses: advice.courses,
        reasoning: advice.reasoning,
    })
}

pub async fn compose_skill_gaps(
    orchestrator: &Orchestrator,
    stage: StageId,
    desired_job: &str,
    scored: &ScoredResult,
) -> Result<SkillGapRecommendation, PipelineError> {
    let max_gaps = orchestrator.settings().max_prompt_gaps;
    let prompt = build_gap_course_prompt(desired_job, scored, max_gaps);
    let advice: GapAdvice = orchestrator
        .run_stage(PipelineKind::SkillGaps, stage, &prompt)
        .await?;

    Ok(SkillGapRecommendation {
        desired_job: desired_job.trim().to_string(),
        proficiency: ProficiencyReport::from(scored),
        skill_gaps: skill_gaps(scored, &advice.gap_notes),
        courses: advice.courses,
        reasoning: advice.reasoning,
    })
}

pub async fn compose_navigator(
    orchestrator: &Orchestrator,
    stage: StageId,
    inferred_role: &str,
    interests: &str,
    scored: &ScoredResult,
) -> Result<NavigatorRecommendation, PipelineError> {
    let max_gaps = orchestrator.settings().max_prompt_gaps;
    let prompt = build_next_steps_prompt(inferred_role, interests, scored, max_gaps);
    let advice: CourseAdvice = orchestrator
        .run_stage(PipelineKind::Navigator, stage, &prompt)
        .await?;

    Ok(NavigatorRecommendation {
        inferred_role: inferred_role.to_string(),
        proficiency: ProficiencyReport::from(scored),
        skill_gaps: skill_gaps(scored, &[]),
        courses: advice.courses,
        reasoning: advice.reasoning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::fixtures;
    use crate::llm_client::scripted::ScriptedBackend;
    use crate::llm_client::GenerationErrorKind;
    use crate::pipelines::test_support::orchestrator;
    use indexmap::IndexMap;
    use std::sync::Arc;

    const STAGE: StageId = StageId::new(1, "compose");

    fn scored() -> ScoredResult {
        ScoredResult {
            correct_count: 2,
            total_count: 4,
            overall_score: 50,
            per_skill_area_proficiency: [("Rust", 100u8), ("Git", 40), ("SQL", 0)]
                .into_iter()
                .map(|(a, p)| (a.to_string(), p))
                .collect::<IndexMap<_, _>>(),
            identified_gaps: vec!["Git".to_string(), "SQL".to_string()],
            question_results: vec![],
        }
    }

    #[test]
    fn test_proficiency_report_maps_fields_directly() {
        let report = ProficiencyReport::from(&scored());
        assert_eq!(report.overall_score, 50);
        assert_eq!(report.total_count, 4);
        assert_eq!(report.identified_gaps, vec!["Git", "SQL"]);
        assert_eq!(report.per_skill_area_proficiency["Git"], 40);
    }

    #[test]
    fn test_skill_gaps_attach_matching_notes_weakest_first() {
        let notes = vec![
            GapNote {
                skill_area: " sql ".to_string(),
                advice: "Practise joins.".to_string(),
            },
            GapNote {
                skill_area: "Rust".to_string(),
                advice: "Not a gap.".to_string(),
            },
        ];
        let gaps = skill_gaps(&scored(), &notes);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].skill_area, "SQL");
        assert_eq!(gaps[0].advice.as_deref(), Some("Practise joins."));
        assert_eq!(gaps[1].skill_area, "Git");
        assert!(gaps[1].advice.is_none());
    }

    #[tokio::test]
    async fn test_compose_skill_gaps_combines_scored_and_generated_fields() {
        let backend = Arc::new(ScriptedBackend::new().reply_json(fixtures::gap_advice_json()));
        let orch = orchestrator(&backend);

        let rec = compose_skill_gaps(&orch, STAGE, " Backend Engineer ", &scored())
            .await
            .unwrap();
        assert_eq!(rec.desired_job, "Backend Engineer");
        assert_eq!(rec.proficiency.overall_score, 50);
        assert_eq!(rec.skill_gaps[0].skill_area, "SQL");
        assert!(rec.skill_gaps[0].advice.is_some());
        assert_eq!(rec.courses[0].title, "SQL Deep Dive");

        let prompt = &backend.prompts()[0];
        assert!(prompt.contains("- SQL (0%)\n- Git (40%)"));
    }

    #[tokio::test]
    async fn test_compose_surfaces_generation_error_unchanged() {
        let backend = Arc::new(ScriptedBackend::new().reply("{\"courses\": []}"));
        let orch = orchestrator(&backend);

        let err = compose_skills(&orch, STAGE, "Backend Engineer", &scored(), "Q1...")
            .await
            .unwrap_err();
        match err {
            PipelineError::Failed {
                pipeline,
                stage,
                reason,
            } => {
                assert_eq!(pipeline, PipelineKind::Skills);
                assert_eq!(stage, STAGE);
                assert_eq!(reason.kind, GenerationErrorKind::MalformedOutput);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compose_career_keeps_trait_profile() {
        let backend =
            Arc::new(ScriptedBackend::new().reply_json(fixtures::career_suggestions_json()));
        let orch = orchestrator(&backend);
        let profile: TraitProfile =
            serde_json::from_value(fixtures::trait_profile_json()).unwrap();

        let rec = compose_career(&orch, STAGE, profile.clone()).await.unwrap();
        assert_eq!(rec.trait_profile, profile);
        assert_eq!(rec.job_roles[0].title, "Backend Engineer");
    }
}
