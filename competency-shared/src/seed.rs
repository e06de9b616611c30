/// Initial data: the default competency catalogue and the first superuser
///
/// Both operations are idempotent so they can run on every deployment.

use sqlx::PgPool;
use tracing::info;

use crate::auth::password::{hash_password, PasswordError};
use crate::models::{
    competency_item::{CompetencyItem, CreateCompetencyItem},
    question::{CreateQuestion, Question, DEFAULT_MAX_SCORE},
    user::{CreateUser, User},
};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Password(#[from] PasswordError),
}

/// One catalogue entry with its questions in order
pub struct CatalogueItem {
    pub name: &'static str,
    pub description: &'static str,
    pub questions: [&'static str; 3],
}

pub static DEFAULT_CATALOGUE: [CatalogueItem; 10] = [
    CatalogueItem {
        name: "Leadership",
        description: "Guiding a team and exercising influence toward its goals",
        questions: [
            "I can give team members a clear sense of direction",
            "I can lead the team calmly even in difficult situations",
            "I listen to team members' views and make sound decisions",
        ],
    },
    CatalogueItem {
        name: "Communication",
        description: "Conveying information effectively and building good relationships",
        questions: [
            "I can express my ideas clearly",
            "I can hold a conversation while understanding the other person's position",
            "I give and receive feedback appropriately",
        ],
    },
    CatalogueItem {
        name: "Problem Solving",
        description: "Analysing issues and finding effective solutions",
        questions: [
            "I can grasp the essence of a problem accurately",
            "I weigh several possible solutions and choose the best one",
            "I can propose concrete, workable solutions",
        ],
    },
    CatalogueItem {
        name: "Teamwork",
        description: "Cooperating with others toward a shared goal",
        questions: [
            "I contribute actively as a member of the team",
            "I work cooperatively with other members",
            "I see the team's success as my own",
        ],
    },
    CatalogueItem {
        name: "Adaptability",
        description: "Responding to change and adjusting to new environments",
        questions: [
            "I adapt quickly to new environments and situations",
            "I accept change positively",
            "I respond flexibly to unexpected events",
        ],
    },
    CatalogueItem {
        name: "Expertise",
        description: "Having and applying the knowledge and skills the job requires",
        questions: [
            "I have the specialist knowledge my work requires",
            "I actively learn the latest knowledge and techniques",
            "I apply my expertise effectively in practice",
        ],
    },
    CatalogueItem {
        name: "Innovation",
        description: "Generating new ideas and driving improvement",
        questions: [
            "I propose new ideas without being bound by existing methods",
            "I can come up with creative solutions",
            "I actively suggest improvements",
        ],
    },
    CatalogueItem {
        name: "Time Management",
        description: "Using time efficiently and delivering work on schedule",
        questions: [
            "I prioritise my work appropriately",
            "I finish work by the deadline",
            "I use my time efficiently",
        ],
    },
    CatalogueItem {
        name: "Responsibility",
        description: "Understanding one's role and carrying it out accountably",
        questions: [
            "I fully carry out the roles and responsibilities given to me",
            "I take responsibility for dealing with my mistakes",
            "I always keep my promises and deadlines",
        ],
    },
    CatalogueItem {
        name: "Growth Mindset",
        description: "A continuous drive to learn and improve oneself",
        questions: [
            "I actively try to learn new skills and knowledge",
            "I use feedback as an opportunity to grow",
            "I recognise where I need to improve and work on it",
        ],
    },
];

/// Outcome of [`seed_competencies`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created { items: usize, questions: usize },
    AlreadySeeded,
}

/// Inserts [`DEFAULT_CATALOGUE`] unless any competency item exists
///
/// Items are ordered 1..=10; questions are numbered sequentially across the
/// whole catalogue and use the default max score.
pub async fn seed_competencies(pool: &PgPool) -> Result<SeedOutcome, SeedError> {
    let mut tx = pool.begin().await?;

    if CompetencyItem::count(&mut *tx).await? > 0 {
        info!("Competency items already exist, skipping seed");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let mut question_order = 0;
    for (index, entry) in DEFAULT_CATALOGUE.iter().enumerate() {
        let item = CompetencyItem::create(
            &mut *tx,
            CreateCompetencyItem {
                name: entry.name.to_string(),
                description: Some(entry.description.to_string()),
                display_order: index as i32 + 1,
            },
        )
        .await?;

        for text in entry.questions {
            question_order += 1;
            Question::create(
                &mut *tx,
                CreateQuestion {
                    text: text.to_string(),
                    competency_item_id: item.id,
                    display_order: question_order,
                    max_score: DEFAULT_MAX_SCORE,
                },
            )
            .await?;
        }
    }

    tx.commit().await?;

    let outcome = SeedOutcome::Created {
        items: DEFAULT_CATALOGUE.len(),
        questions: question_order as usize,
    };
    info!(?outcome, "Seeded competency catalogue");
    Ok(outcome)
}

/// Creates a superuser unless `email` is already registered
///
/// Returns the existing account untouched in that case, with `false`.
pub async fn create_superuser(
    pool: &PgPool,
    email: &str,
    password: &str,
    name: &str,
) -> Result<(User, bool), SeedError> {
    if let Some(existing) = User::find_by_email(pool, email).await? {
        info!(email, "Superuser already exists");
        return Ok((existing, false));
    }

    let user = User::create(
        pool,
        CreateUser {
            email: email.to_string(),
            password_hash: hash_password(password)?,
            name: name.to_string(),
            department: None,
            position: None,
            is_superuser: true,
        },
    )
    .await?;

    info!(user_id = %user.id, email, "Superuser created");
    Ok((user, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_names_unique() {
        let names: HashSet<&str> = DEFAULT_CATALOGUE.iter().map(|i| i.name).collect();
        assert_eq!(names.len(), DEFAULT_CATALOGUE.len());
    }

    #[test]
    fn test_catalogue_covers_rule_based_names() {
        // Career suggestions and book tags key off these names
        for name in ["Leadership", "Communication", "Innovation", "Time Management", "Expertise"] {
            assert!(DEFAULT_CATALOGUE.iter().any(|i| i.name == name), "{name} missing");
        }
    }

    #[test]
    fn test_catalogue_has_thirty_questions() {
        let total: usize = DEFAULT_CATALOGUE.iter().map(|i| i.questions.len()).sum();
        assert_eq!(total, 30);
    }
}
