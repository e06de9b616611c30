/// Prompt construction for feedback generation

use super::parser::Section;
use super::FeedbackInput;

const NOT_SET: &str = "not set";

/// Persona for the completion model
pub const HR_CONSULTANT_SYSTEM_PROMPT: &str = "\
You are a senior HR consultant with more than twenty years of experience \
supporting the career development of hundreds of professionals.

Character:
- Warm but demanding, focused on outcomes rather than flattery.
- You believe growth involves discomfort and you say hard things when they are true.

Consulting principles:
1. Give realistic assessments; inflated praise holds people back.
2. Make the most of strengths and shore up weaknesses strategically.
3. Reconcile personal goals with what the organisation needs.
4. Lay out short, medium and long term steps.
5. Name concrete actions, learning resources and measurable targets.

Feedback style:
- Explain why each point matters.
- Say exactly what to do next.
- Be strict yet supportive, and adapt advice to the person's personality \
and learning style.";

/// Builds the user prompt from scores and the optional career plan
pub fn build_feedback_prompt(input: &FeedbackInput) -> String {
    let competency_json = serde_json::to_string_pretty(&input.competencies)
        .unwrap_or_else(|_| "[]".to_string());

    let mut prompt = String::new();
    prompt.push_str(&format!("Person being evaluated: {}\n\n", input.user_name));
    prompt.push_str("Competency evaluation results:\n");
    prompt.push_str(&competency_json);
    prompt.push_str("\n\n");

    if let Some(plan) = &input.career_plan {
        prompt.push_str("Career plan:\n");
        for (label, value) in plan.labeled_fields() {
            let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(NOT_SET);
            prompt.push_str(&format!("- {}: {}\n", label, value));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "\
Based on these results and the career plan, give strict and practical feedback covering:
1. Current state: an objective view of strengths and weaknesses, and how they compare with the company average.
2. Strategy: how to use the strengths, and practical ways to compensate for the weaknesses.
3. Action plan: goals for 3 months, 1 year and 3 years, with concrete steps and ways to measure progress.
4. Learning resources: about three recommended books and specific training methods.
5. Reality check: the obstacles and uncomfortable truths this person must face.

Answer using exactly these section headers, in English, each on its own line:\n\n",
    );

    for section in Section::ALL {
        prompt.push_str(section.header());
        prompt.push_str(":\n");
    }

    prompt.push_str("\nKeep every section under 300 words and make it specific and actionable.\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::CompetencySnapshot;
    use crate::models::career_plan::UserCareerPlan;
    use chrono::Utc;
    use uuid::Uuid;

    fn input(career_plan: Option<UserCareerPlan>) -> FeedbackInput {
        FeedbackInput {
            user_name: "Aiko".to_string(),
            competencies: vec![CompetencySnapshot::new(
                "Leadership",
                Some("Sets direction".to_string()),
                4.5,
                Some(3.5),
            )],
            career_plan,
        }
    }

    #[test]
    fn test_prompt_contains_scores_and_headers() {
        let prompt = build_feedback_prompt(&input(None));

        assert!(prompt.contains("Person being evaluated: Aiko"));
        assert!(prompt.contains("\"name\": \"Leadership\""));
        assert!(prompt.contains("\"user_score\": 4.5"));
        assert!(prompt.contains("\"gap_analysis\": \"strength\""));
        for section in Section::ALL {
            assert!(prompt.contains(&format!("{}:", section.header())));
        }
        assert!(!prompt.contains("Career plan:"));
    }

    #[test]
    fn test_prompt_includes_career_plan_with_not_set() {
        let plan = UserCareerPlan {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            career_direction: Some("Product management".to_string()),
            target_position: Some("  ".to_string()),
            target_timeframe: None,
            strengths_to_enhance: None,
            weaknesses_to_overcome: None,
            specific_goals: None,
            personality_traits: None,
            preferred_learning_style: None,
            challenges_faced: None,
            motivation_factors: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let prompt = build_feedback_prompt(&input(Some(plan)));

        assert!(prompt.contains("- Career direction: Product management"));
        assert!(prompt.contains("- Target position: not set"));
        assert!(prompt.contains("- Motivation factors: not set"));
    }
}
