/// Rule-based career suggestions and book recommendations

use super::fallback::{IMPROVEMENT_THRESHOLD, STRENGTH_THRESHOLD};
use super::CompetencySnapshot;
use crate::models::ai_feedback::BookRecommendation;

const MAX_SUGGESTIONS: usize = 5;
const BOOK_COUNT: usize = 3;

struct CatalogueBook {
    title: &'static str,
    author: &'static str,
    reason: &'static str,
    category: &'static str,
    /// Competency names this book addresses, lowercase
    competencies: &'static [&'static str],
}

impl CatalogueBook {
    fn to_recommendation(&self) -> BookRecommendation {
        BookRecommendation {
            title: self.title.to_string(),
            author: self.author.to_string(),
            reason: self.reason.to_string(),
            category: self.category.to_string(),
        }
    }
}

/// Recommended to everyone, in this order, when nothing more specific fits
static CLASSICS: [CatalogueBook; 3] = [
    CatalogueBook {
        title: "The 7 Habits of Highly Effective People",
        author: "Stephen R. Covey",
        reason: "Essential principles for personal effectiveness",
        category: "Self-development / Leadership",
        competencies: &[],
    },
    CatalogueBook {
        title: "How to Win Friends and Influence People",
        author: "Dale Carnegie",
        reason: "Builds interpersonal and communication skills",
        category: "Communication",
        competencies: &[],
    },
    CatalogueBook {
        title: "Essentialism",
        author: "Greg McKeown",
        reason: "Focus on what matters most and raise your productivity",
        category: "Time management / Productivity",
        competencies: &[],
    },
];

static TARGETED: [CatalogueBook; 10] = [
    CatalogueBook {
        title: "Leaders Eat Last",
        author: "Simon Sinek",
        reason: "Shows how trust and safety let a team follow your lead",
        category: "Leadership",
        competencies: &["leadership"],
    },
    CatalogueBook {
        title: "Crucial Conversations",
        author: "Kerry Patterson, Joseph Grenny, Ron McMillan, Al Switzler",
        reason: "Practical tools for conversations where stakes are high",
        category: "Communication",
        competencies: &["communication"],
    },
    CatalogueBook {
        title: "Thinking, Fast and Slow",
        author: "Daniel Kahneman",
        reason: "Understand the biases that derail judgement and problem solving",
        category: "Problem solving",
        competencies: &["problem solving"],
    },
    CatalogueBook {
        title: "The Five Dysfunctions of a Team",
        author: "Patrick Lencioni",
        reason: "Diagnoses why teams fail and how to fix it",
        category: "Teamwork",
        competencies: &["teamwork"],
    },
    CatalogueBook {
        title: "Who Moved My Cheese?",
        author: "Spencer Johnson",
        reason: "A short guide to responding well to change",
        category: "Adaptability",
        competencies: &["adaptability"],
    },
    CatalogueBook {
        title: "Peak: Secrets from the New Science of Expertise",
        author: "Anders Ericsson, Robert Pool",
        reason: "How deliberate practice builds real expertise",
        category: "Expertise",
        competencies: &["expertise"],
    },
    CatalogueBook {
        title: "The Innovator's Dilemma",
        author: "Clayton M. Christensen",
        reason: "Why good organisations miss new ideas, and how not to",
        category: "Innovation",
        competencies: &["innovation"],
    },
    CatalogueBook {
        title: "Getting Things Done",
        author: "David Allen",
        reason: "A dependable system for managing tasks and time",
        category: "Time management / Productivity",
        competencies: &["time management"],
    },
    CatalogueBook {
        title: "Extreme Ownership",
        author: "Jocko Willink, Leif Babin",
        reason: "Taking full responsibility for outcomes",
        category: "Responsibility",
        competencies: &["responsibility"],
    },
    CatalogueBook {
        title: "Mindset: The New Psychology of Success",
        author: "Carol S. Dweck",
        reason: "Why believing abilities can grow changes how you learn",
        category: "Growth mindset",
        competencies: &["growth mindset", "adaptability"],
    },
];

fn is_named(competency: &CompetencySnapshot, name: &str) -> bool {
    competency.name.trim().eq_ignore_ascii_case(name)
}

fn sorted_by_score(competencies: &[CompetencySnapshot], descending: bool) -> Vec<&CompetencySnapshot> {
    let mut sorted: Vec<&CompetencySnapshot> = competencies.iter().collect();
    sorted.sort_by(|a, b| {
        let ordering = a.user_score.total_cmp(&b.user_score);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    sorted
}

/// Suggests next career steps from the strongest and weakest competencies
///
/// High scores in leadership, communication or innovation among the top
/// three suggest roles; low scores in time management or expertise among the
/// weakest two suggest training. A closing reflection suggestion is always
/// included, and at most five suggestions are returned.
pub fn career_suggestions(competencies: &[CompetencySnapshot]) -> Vec<String> {
    let mut suggestions = Vec::new();

    for competency in sorted_by_score(competencies, true).into_iter().take(3) {
        if competency.user_score < STRENGTH_THRESHOLD {
            continue;
        }
        if is_named(competency, "Leadership") {
            suggestions.push(
                "Take on a team lead or project manager role to put your leadership to work."
                    .to_string(),
            );
        } else if is_named(competency, "Communication") {
            suggestions.push(
                "You could thrive as a mentor or in onboarding and training new colleagues."
                    .to_string(),
            );
        } else if is_named(competency, "Innovation") {
            suggestions.push(
                "Join new business development or process improvement projects.".to_string(),
            );
        }
    }

    for competency in sorted_by_score(competencies, false).into_iter().take(2) {
        if competency.user_score >= IMPROVEMENT_THRESHOLD {
            continue;
        }
        if is_named(competency, "Time Management") {
            suggestions.push(
                "Adopt a task management tool and consider a time management course.".to_string(),
            );
        } else if is_named(competency, "Expertise") {
            suggestions.push(
                "Attend study groups or training on the latest developments in your field."
                    .to_string(),
            );
        }
    }

    if suggestions.is_empty() {
        suggestions.push(
            "Keep building on your current strengths while taking on new challenges.".to_string(),
        );
    }

    suggestions.push(
        "Reflect regularly and set new goals to keep growing continuously.".to_string(),
    );

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Picks three books, favouring the two weakest competencies
///
/// Each weak competency contributes at most one targeted book; the rest is
/// filled from the classics. Titles never repeat.
pub fn book_recommendations(competencies: &[CompetencySnapshot]) -> Vec<BookRecommendation> {
    let mut picked: Vec<&CatalogueBook> = Vec::with_capacity(BOOK_COUNT);

    for competency in sorted_by_score(competencies, false).into_iter().take(2) {
        let name = competency.name.trim().to_lowercase();
        let book = TARGETED.iter().find(|book| {
            book.competencies.contains(&name.as_str())
                && !picked.iter().any(|p| p.title == book.title)
        });
        if let Some(book) = book {
            picked.push(book);
        }
    }

    for book in &CLASSICS {
        if picked.len() >= BOOK_COUNT {
            break;
        }
        if !picked.iter().any(|p| p.title == book.title) {
            picked.push(book);
        }
    }

    picked.iter().map(|book| book.to_recommendation()).collect()
}
