/// Templated feedback used when the model is unavailable

use super::FeedbackInput;
use crate::models::ai_feedback::FeedbackSections;

/// Scores at or above this are reported as strengths
pub const STRENGTH_THRESHOLD: f64 = 4.0;

/// Scores below this are reported as improvement areas
pub const IMPROVEMENT_THRESHOLD: f64 = 3.0;

/// Builds deterministic feedback from the scores alone
pub fn default_sections(input: &FeedbackInput) -> FeedbackSections {
    let strengths: Vec<String> = input
        .competencies
        .iter()
        .filter(|c| c.user_score >= STRENGTH_THRESHOLD)
        .map(|c| {
            format!(
                "• {}: excellent score ({:.1}). Use this strength to support the people around you.",
                c.name, c.user_score
            )
        })
        .collect();

    let improvements: Vec<String> = input
        .competencies
        .iter()
        .filter(|c| c.user_score < IMPROVEMENT_THRESHOLD)
        .map(|c| {
            format!(
                "• {}: needs improvement ({:.1}). Draw up a concrete learning plan and work through it.",
                c.name, c.user_score
            )
        })
        .collect();

    let career_direction = input
        .career_plan
        .as_ref()
        .and_then(|plan| plan.career_direction.as_deref())
        .map(str::trim)
        .filter(|direction| !direction.is_empty());

    let action_plan = match career_direction {
        Some(direction) => format!(
            "To move toward \"{}\", set a concrete short-term skill development plan, \
             and in the medium term actively seek opportunities to take the lead.",
            direction
        ),
        None => "Set a concrete short-term skill development plan, and in the medium term \
                 actively seek opportunities to take the lead."
            .to_string(),
    };

    FeedbackSections {
        strengths: if strengths.is_empty() {
            "Consistent effort shows. Keep developing your strengths further.".to_string()
        } else {
            strengths.join("\n")
        },
        improvements: if improvements.is_empty() {
            "Your profile is well balanced overall. Aim for the next level.".to_string()
        } else {
            improvements.join("\n")
        },
        action_plan,
        learning_resources: "Recommended reading: 1) The 7 Habits of Highly Effective People, \
                             2) How to Win Friends and Influence People, 3) Essentialism. \
                             Start with these foundational business books."
            .to_string(),
        reality_check: "Growth takes sustained effort and sometimes uncomfortable challenges. \
                        Be ready to step out of your comfort zone and try new things."
            .to_string(),
        overall: "Building on this evaluation, develop your skills deliberately and \
                  strategically to increase the value you bring to the organisation."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::CompetencySnapshot;
    use crate::models::career_plan::UserCareerPlan;
    use chrono::Utc;
    use uuid::Uuid;

    fn snapshot(name: &str, score: f64) -> CompetencySnapshot {
        CompetencySnapshot::new(name, None, score, Some(3.0))
    }

    fn input(scores: &[(&str, f64)], career_direction: Option<&str>) -> FeedbackInput {
        FeedbackInput {
            user_name: "Test".to_string(),
            competencies: scores.iter().map(|(n, s)| snapshot(n, *s)).collect(),
            career_plan: career_direction.map(|direction| UserCareerPlan {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                career_direction: Some(direction.to_string()),
                target_position: None,
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
            }),
        }
    }

    #[test]
    fn test_thresholds_split_strengths_and_improvements() {
        let sections = default_sections(&input(
            &[("Leadership", 4.0), ("Teamwork", 3.5), ("Time Management", 2.9)],
            None,
        ));

        assert!(sections.strengths.contains("Leadership: excellent score (4.0)"));
        assert!(!sections.strengths.contains("Teamwork"));
        assert!(sections.improvements.contains("Time Management: needs improvement (2.9)"));
        assert!(!sections.improvements.contains("Teamwork"));
        assert!(!sections.is_blank());
    }

    #[test]
    fn test_generic_text_when_no_extremes() {
        let sections = default_sections(&input(&[("Teamwork", 3.5)], None));

        assert!(sections.strengths.starts_with("Consistent effort"));
        assert!(sections.improvements.starts_with("Your profile is well balanced"));
        assert!(sections.action_plan.starts_with("Set a concrete"));
    }

    #[test]
    fn test_career_direction_in_action_plan() {
        let sections = default_sections(&input(&[("Teamwork", 3.5)], Some("Engineering manager")));
        assert!(sections.action_plan.starts_with("To move toward \"Engineering manager\""));
    }

    #[test]
    fn test_blank_career_direction_ignored() {
        let sections = default_sections(&input(&[("Teamwork", 3.5)], Some("   ")));
        assert!(sections.action_plan.starts_with("Set a concrete"));
    }
}
