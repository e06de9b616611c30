/// Competency score calculation
///
/// Scores are recomputed synchronously every time results are read:
///
/// 1. The user's score for an item is the mean of their answer scores for
///    that item's questions. Items they haven't answered get no score.
/// 2. The company average for an item is the mean of every user's score for
///    it, along with the number of distinct users behind it.
///
/// Both steps run in one transaction so a results read never sees a
/// half-written recalculation.
///
/// # Example
///
/// ```no_run
/// use competency_shared::scoring::get_competency_results;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let results = get_competency_results(&pool, user_id).await?;
/// for entry in &results.user_competencies {
///     println!("{}: {:.2}", entry.competency_item.name, entry.competency.score);
/// }
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    answer::Answer,
    company_average::{CompanyAverageCompetency, CompanyAverageWithItem},
    competency_item::{attach_questions, CompetencyItem, CompetencyItemWithQuestions},
    question::Question,
    user_competency::{UserCompetency, UserCompetencyWithItem},
};

/// Error type for score calculation
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Freshly computed results for one user
#[derive(Debug, Clone, Serialize)]
pub struct CompetencyResults {
    /// The user's scores in competency display order
    pub user_competencies: Vec<UserCompetencyWithItem>,

    /// Company averages in competency display order
    pub company_averages: Vec<CompanyAverageWithItem>,
}

impl CompetencyResults {
    pub fn is_empty(&self) -> bool {
        self.user_competencies.is_empty()
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(scores: &[i32]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }

    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    Some(sum as f64 / scores.len() as f64)
}

/// Computes a user's per-item scores from their answers
///
/// Returns `(competency_item_id, mean)` pairs in item order, skipping items
/// with no answered questions. Answers to questions outside `items` are
/// ignored.
pub fn calculate_user_scores(
    items: &[CompetencyItemWithQuestions],
    answers: &[Answer],
) -> Vec<(Uuid, f64)> {
    let by_question: HashMap<Uuid, i32> = answers
        .iter()
        .map(|answer| (answer.question_id, answer.score))
        .collect();

    items
        .iter()
        .filter_map(|entry| {
            let scores: Vec<i32> = entry
                .questions
                .iter()
                .filter_map(|question| by_question.get(&question.id).copied())
                .collect();

            mean(&scores).map(|score| (entry.item.id, score))
        })
        .collect()
}

/// Recomputes and returns the user's scores and the company averages
pub async fn get_competency_results(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<CompetencyResults, ScoringError> {
    let mut tx = pool.begin().await?;

    let items = CompetencyItem::list_ordered(&mut *tx).await?;
    let questions = Question::list_all(&mut *tx).await?;
    let answers = Answer::list_for_user(&mut *tx, user_id).await?;

    let catalogue = attach_questions(items.clone(), questions);
    let scores = calculate_user_scores(&catalogue, &answers);

    for (competency_item_id, score) in &scores {
        UserCompetency::upsert(&mut *tx, user_id, *competency_item_id, *score).await?;
    }

    let scored: Vec<Uuid> = scores.iter().map(|(id, _)| *id).collect();
    let removed = UserCompetency::delete_stale(&mut *tx, user_id, &scored).await?;

    debug!(
        %user_id,
        answers = answers.len(),
        scored_items = scores.len(),
        removed_stale = removed,
        "User competency scores recalculated"
    );

    let aggregates = CompanyAverageCompetency::aggregate(&mut *tx).await?;
    for aggregate in &aggregates {
        let total_users = i32::try_from(aggregate.total_users).unwrap_or(i32::MAX);
        CompanyAverageCompetency::upsert(
            &mut *tx,
            aggregate.competency_item_id,
            aggregate.average_score,
            total_users,
        )
        .await?;
    }
    CompanyAverageCompetency::delete_unscored(&mut *tx).await?;

    let user_competencies = UserCompetency::list_for_user(&mut *tx, user_id).await?;
    let company_averages = CompanyAverageCompetency::list(&mut *tx).await?;

    tx.commit().await?;

    info!(
        %user_id,
        user_items = user_competencies.len(),
        company_items = company_averages.len(),
        "Competency results computed"
    );

    Ok(join_items(&items, user_competencies, company_averages))
}

fn join_items(
    items: &[CompetencyItem],
    user_competencies: Vec<UserCompetency>,
    company_averages: Vec<CompanyAverageCompetency>,
) -> CompetencyResults {
    let by_id: HashMap<Uuid, &CompetencyItem> = items.iter().map(|item| (item.id, item)).collect();

    let user_competencies = user_competencies
        .into_iter()
        .filter_map(|competency| {
            let competency_item = (*by_id.get(&competency.competency_item_id)?).clone();
            Some(UserCompetencyWithItem {
                competency,
                competency_item,
            })
        })
        .collect();

    let company_averages = company_averages
        .into_iter()
        .filter_map(|average| {
            let competency_item = (*by_id.get(&average.competency_item_id)?).clone();
            Some(CompanyAverageWithItem {
                average,
                competency_item,
            })
        })
        .collect();

    CompetencyResults {
        user_competencies,
        company_averages,
    }
}
