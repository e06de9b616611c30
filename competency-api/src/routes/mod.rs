/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `users`: Account management
/// - `questions`: Questionnaire questions
/// - `answers`: Answer submission
/// - `competencies`: Items, computed results and AI feedback
/// - `career_plans`: The caller's career plan

pub mod answers;
pub mod auth;
pub mod career_plans;
pub mod competencies;
pub mod health;
pub mod questions;
pub mod users;

use serde::Deserialize;
use validator::Validate;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// `skip`/`limit` query parameters
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct Pagination {
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must not be negative"))]
    pub skip: i64,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = MAX_LIMIT, message = "limit must be between 1 and 1000"))]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Validated `(limit, offset)` for model queries
    pub fn bounds(&self) -> Result<(i64, i64), crate::error::ApiError> {
        self.validate()?;
        Ok((self.limit, self.skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page.bounds().unwrap(), (100, 0));
    }

    #[test]
    fn test_pagination_rejects_out_of_range() {
        let page = Pagination { skip: -1, limit: 10 };
        assert!(page.bounds().is_err());

        let page = Pagination { skip: 0, limit: 0 };
        assert!(page.bounds().is_err());

        let page = Pagination { skip: 0, limit: 5000 };
        assert!(page.bounds().is_err());
    }

    #[test]
    fn test_pagination_limit_boundary() {
        let page = Pagination { skip: 20, limit: MAX_LIMIT };
        assert_eq!(page.bounds().unwrap(), (MAX_LIMIT, 20));

        let page = Pagination { skip: 0, limit: MAX_LIMIT + 1 };
        match page.bounds() {
            Err(crate::error::ApiError::ValidationError(details)) => {
                assert_eq!(details[0].field, "limit");
                assert!(details[0].message.contains(&MAX_LIMIT.to_string()));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
