//! Canned model outputs and quizzes shared by unit tests.

use serde_json::{json, Value};

use crate::contracts::quiz::{ExploratoryQuiz, GradedQuiz};

pub fn interest_quiz_json() -> Value {
    json!({
        "questions": [
            {
                "text": "Which activity sounds most fun?",
                "options": ["Fixing a bike", "Planning an event", "Writing a story"],
                "selection_mode": "single"
            },
            {
                "text": "Which subjects did you enjoy?",
                "options": ["Maths", "Art", "Biology", "History"],
                "selection_mode": "multiple"
            }
        ]
    })
}

pub fn interest_quiz() -> ExploratoryQuiz {
    serde_json::from_value(interest_quiz_json()).unwrap()
}

/// Three questions over two skill areas: "Rust" (q0, q2) and "SQL" (q1).
pub fn skill_quiz_json() -> Value {
    json!({
        "questions": [
            {
                "text": "Which keyword moves ownership into a closure?",
                "options": ["ref", "move", "static", "dyn"],
                "selection_mode": "single",
                "correct_option_index": 1,
                "skill_area": "Rust"
            },
            {
                "text": "Which clauses filter rows?",
                "options": ["WHERE", "ORDER BY", "HAVING"],
                "selection_mode": "multiple",
                "correct_option_indices": [0, 2],
                "skill_area": "SQL"
            },
            {
                "text": "Which trait enables `?` conversion of errors?",
                "options": ["From", "Into", "AsRef"],
                "selection_mode": "single",
                "correct_option_index": 0,
                "explanation": "`?` calls From::from on the error.",
                "skill_area": "Rust"
            }
        ]
    })
}

pub fn skill_quiz() -> GradedQuiz {
    serde_json::from_value(skill_quiz_json()).unwrap()
}

pub fn trait_profile_json() -> Value {
    json!({
        "trait_scores": {"Analytical": 85, "Creative": 55, "Social": 30},
        "summary": "You like taking systems apart and understanding how they work."
    })
}

pub fn career_suggestions_json() -> Value {
    json!({
        "job_roles": [
            {"title": "Backend Engineer", "reason": "Strong analytical preference."}
        ],
        "courses": [
            {"title": "Systems Programming", "provider": "edX", "reason": "Builds on analytical strength."}
        ]
    })
}

pub fn course_advice_json() -> Value {
    json!({
        "courses": [
            {"title": "SQL Deep Dive", "reason": "SQL is the weakest area."}
        ],
        "reasoning": "Rust fundamentals are solid; invest in SQL next."
    })
}

pub fn gap_advice_json() -> Value {
    json!({
        "gap_notes": [
            {"skill_area": "sql", "advice": "Practise HAVING versus WHERE."}
        ],
        "courses": [
            {"title": "SQL Deep Dive", "provider": "Coursera", "reason": "Closes the SQL gap."}
        ],
        "reasoning": "SQL is the only gap."
    })
}
