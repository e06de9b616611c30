/// Parsing of free-text model output into feedback sections
///
/// The model is asked to answer with a fixed set of English headers. Models
/// drift, so a header is recognised in any of these shapes:
///
/// ```text
/// STRENGTH_ANALYSIS:
/// STRENGTH_ANALYSIS: inline text
/// 【STRENGTH_ANALYSIS】
/// 【STRENGTH_ANALYSIS】: inline text
/// ## STRENGTH_ANALYSIS:
/// **STRENGTH_ANALYSIS:**
/// ```
///
/// Text before the first header is dropped.

use crate::models::ai_feedback::FeedbackSections;

/// One labeled section of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Strengths,
    Improvements,
    ActionPlan,
    LearningResources,
    RealityCheck,
    Overall,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Strengths,
        Section::Improvements,
        Section::ActionPlan,
        Section::LearningResources,
        Section::RealityCheck,
        Section::Overall,
    ];

    /// Header the model is asked to emit
    pub fn header(self) -> &'static str {
        match self {
            Section::Strengths => "STRENGTH_ANALYSIS",
            Section::Improvements => "WEAKNESS_STRATEGY",
            Section::ActionPlan => "ACTION_PLAN",
            Section::LearningResources => "LEARNING_RESOURCES",
            Section::RealityCheck => "REALITY_CHECK",
            Section::Overall => "OVERALL_STRATEGY",
        }
    }

    fn slot(self, sections: &mut FeedbackSections) -> &mut String {
        match self {
            Section::Strengths => &mut sections.strengths,
            Section::Improvements => &mut sections.improvements,
            Section::ActionPlan => &mut sections.action_plan,
            Section::LearningResources => &mut sections.learning_resources,
            Section::RealityCheck => &mut sections.reality_check,
            Section::Overall => &mut sections.overall,
        }
    }
}

/// Recognises a header line, returning its section and any inline text
fn match_header(line: &str) -> Option<(Section, &str)> {
    let stripped = line
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim();

    for section in Section::ALL {
        let header = section.header();

        let rest = if let Some(bracketed) = stripped.strip_prefix('【') {
            bracketed.strip_prefix(header).and_then(|r| r.strip_prefix('】'))
        } else {
            stripped
                .strip_prefix(header)
                .filter(|r| r.trim_start_matches('*').starts_with(':') || r.trim_matches('*').is_empty())
        };

        if let Some(rest) = rest {
            let inline = rest
                .trim_start_matches('*')
                .trim_start()
                .strip_prefix(':')
                .unwrap_or(rest)
                .trim()
                .trim_matches('*')
                .trim();
            return Some((section, inline));
        }
    }

    None
}

/// Splits model output into sections
///
/// Every non-empty line is appended to the section most recently opened by a
/// header, and each section is trimmed at the end. Missing sections stay
/// empty; callers decide whether the result is usable.
pub fn parse_sections(text: &str) -> FeedbackSections {
    let mut sections = FeedbackSections::default();
    let mut current: Option<Section> = None;

    for raw in text.lines() {
        let line = raw.trim();

        if let Some((section, inline)) = match_header(line) {
            current = Some(section);
            if !inline.is_empty() {
                let slot = section.slot(&mut sections);
                slot.push_str(inline);
                slot.push('\n');
            }
            continue;
        }

        if let (Some(section), false) = (current, line.is_empty()) {
            let slot = section.slot(&mut sections);
            slot.push_str(line);
            slot.push('\n');
        }
    }

    for section in Section::ALL {
        let slot = section.slot(&mut sections);
        let trimmed = slot.trim().to_string();
        *slot = trimmed;
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_plain_headers() {
        let text = "\
STRENGTH_ANALYSIS:
Strong communicator.
Trusted by peers.

WEAKNESS_STRATEGY:
Delegate more.
ACTION_PLAN:
Run one retro a month.
LEARNING_RESOURCES:
Read Essentialism.
REALITY_CHECK:
Progress will be slow at first.
OVERALL_STRATEGY:
Lean into leadership.";

        let sections = parse_sections(text);

        assert_eq!(sections.strengths, "Strong communicator.\nTrusted by peers.");
        assert_eq!(sections.improvements, "Delegate more.");
        assert_eq!(sections.action_plan, "Run one retro a month.");
        assert_eq!(sections.learning_resources, "Read Essentialism.");
        assert_eq!(sections.reality_check, "Progress will be slow at first.");
        assert_eq!(sections.overall, "Lean into leadership.");
    }

    #[test]
    fn test_inline_content_after_colon_kept() {
        let sections = parse_sections("STRENGTH_ANALYSIS: Great listener\nand mentor");
        assert_eq!(sections.strengths, "Great listener\nand mentor");
    }

    #[test]
    fn test_bracketed_headers() {
        let text = "【WEAKNESS_STRATEGY】\nPlan your week.\n【OVERALL_STRATEGY】: Keep going";
        let sections = parse_sections(text);

        assert_eq!(sections.improvements, "Plan your week.");
        assert_eq!(sections.overall, "Keep going");
    }

    #[test]
    fn test_markdown_wrapped_headers() {
        let text = "## ACTION_PLAN:\n- step one\n**REALITY_CHECK:**\nHard truths\n**OVERALL_STRATEGY**: Stay curious";
        let sections = parse_sections(text);

        assert_eq!(sections.action_plan, "- step one");
        assert_eq!(sections.reality_check, "Hard truths");
        assert_eq!(sections.overall, "Stay curious");
    }

    #[test]
    fn test_preamble_dropped_and_missing_sections_empty() {
        let text = "Sure! Here is your feedback.\nOVERALL_STRATEGY:\nBalanced profile.";
        let sections = parse_sections(text);

        assert_eq!(sections.overall, "Balanced profile.");
        assert!(sections.strengths.is_empty());
        assert!(sections.action_plan.is_empty());
    }

    #[test]
    fn test_header_prefix_words_are_not_headers() {
        let text = "OVERALL_STRATEGY:\nACTION_PLANNING is a skill worth building.";
        let sections = parse_sections(text);

        assert_eq!(sections.overall, "ACTION_PLANNING is a skill worth building.");
        assert!(sections.action_plan.is_empty());
    }

    #[test]
    fn test_unstructured_text_is_blank() {
        assert!(parse_sections("I cannot help with that.").is_blank());
        assert!(parse_sections("").is_blank());
    }
}
