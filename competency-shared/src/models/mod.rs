/// Database models
///
/// One module per table, each exposing async CRUD functions over `PgPool`.
/// Functions that the scoring routine calls inside a transaction take any
/// `PgExecutor` instead.
///
/// # Models
///
/// - `user`: accounts and credentials
/// - `competency_item`: skill categories
/// - `question`: questionnaire items belonging to a competency
/// - `answer`: a user's score for a question
/// - `user_competency`: derived per-user averages
/// - `company_average`: derived company-wide averages
/// - `career_plan`: optional free-text career plan
/// - `ai_feedback`: cached feedback reports
///
/// # Example
///
/// ```no_run
/// use competency_shared::models::competency_item::CompetencyItem;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// for entry in CompetencyItem::list_with_questions(&pool, 100, 0).await? {
///     println!("{}: {} questions", entry.item.name, entry.questions.len());
/// }
/// # Ok(())
/// # }
/// ```

pub mod ai_feedback;
pub mod answer;
pub mod career_plan;
pub mod company_average;
pub mod competency_item;
pub mod question;
pub mod user;
pub mod user_competency;
