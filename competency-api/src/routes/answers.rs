/// Answer endpoints
///
/// - `POST /api/v1/answers` - Submit scores
/// - `GET /api/v1/answers` - The caller's answers

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Extension, Json};
use competency_shared::models::{
    answer::{Answer, AnswerInput},
    question::Question,
    user::User,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(length(min = 1, message = "At least one answer is required"))]
    pub answers: Vec<AnswerInput>,
}

/// Checks each answer against its question
///
/// Unknown questions fail first with 404; every out-of-range score is then
/// reported in one 422.
fn check_answers(answers: &[AnswerInput], questions: &[Question]) -> Result<(), ApiError> {
    let by_id: HashMap<Uuid, &Question> = questions.iter().map(|q| (q.id, q)).collect();

    if let Some(missing) = answers.iter().find(|a| !by_id.contains_key(&a.question_id)) {
        return Err(ApiError::NotFound(format!(
            "Question {} not found",
            missing.question_id
        )));
    }

    let out_of_range: Vec<ValidationErrorDetail> = answers
        .iter()
        .enumerate()
        .filter_map(|(index, answer)| {
            let question = by_id.get(&answer.question_id)?;
            (!question.accepts_score(answer.score)).then(|| {
                ValidationErrorDetail::new(
                    format!("answers[{}].score", index),
                    format!("Score must be between 1 and {}", question.max_score),
                )
            })
        })
        .collect();

    if !out_of_range.is_empty() {
        return Err(ApiError::ValidationError(out_of_range));
    }

    Ok(())
}

/// Submit answers
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/answers
///
/// { "answers": [{ "question_id": "uuid", "score": 4 }] }
/// ```
///
/// Answers are upserted in one transaction that also drops the caller's
/// cached feedback.
///
/// # Errors
///
/// - `404 Not Found`: A question does not exist
/// - `422 Unprocessable Entity`: Empty list or score out of range
pub async fn submit_answers(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<SubmitAnswersRequest>,
) -> ApiResult<Json<Vec<Answer>>> {
    req.validate()?;

    let ids: Vec<Uuid> = req.answers.iter().map(|a| a.question_id).collect();
    let questions = Question::find_many(&state.db, &ids).await?;
    check_answers(&req.answers, &questions)?;

    let saved = Answer::bulk_upsert(&state.db, caller.id, &req.answers).await?;

    tracing::info!(user_id = %caller.id, count = saved.len(), "Answers submitted");
    Ok(Json(saved))
}

pub async fn list_answers(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> ApiResult<Json<Vec<Answer>>> {
    Ok(Json(Answer::list_for_user(&state.db, caller.id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn question(max_score: i32) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "I plan my week".to_string(),
            competency_item_id: Uuid::new_v4(),
            display_order: 1,
            max_score,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_answers_pass() {
        let q = question(5);
        let answers = [
            AnswerInput { question_id: q.id, score: 1 },
            AnswerInput { question_id: q.id, score: 5 },
        ];
        assert!(check_answers(&answers, &[q]).is_ok());
    }

    #[test]
    fn test_unknown_question_is_not_found() {
        let q = question(5);
        let answers = [AnswerInput { question_id: Uuid::new_v4(), score: 3 }];
        assert!(matches!(check_answers(&answers, &[q]), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_out_of_range_scores_reported_per_index() {
        let q = question(5);
        let answers = [
            AnswerInput { question_id: q.id, score: 0 },
            AnswerInput { question_id: q.id, score: 3 },
            AnswerInput { question_id: q.id, score: 6 },
        ];

        match check_answers(&answers, &[q]) {
            Err(ApiError::ValidationError(details)) => {
                let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["answers[0].score", "answers[2].score"]);
                assert_eq!(details[0].message, "Score must be between 1 and 5");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_custom_max_score_respected() {
        let q = question(10);
        let answers = [AnswerInput { question_id: q.id, score: 8 }];
        assert!(check_answers(&answers, &[q]).is_ok());
    }
}
