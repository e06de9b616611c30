//! # Competency Shared Library
//!
//! Domain logic for the competency self-evaluation backend, used by the API
//! server and the admin CLI.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, access tokens, authentication middleware
//! - `db`: connection pool and embedded migrations
//! - `models`: one module per table
//! - `scoring`: per-user and company-wide competency scores
//! - `feedback`: AI feedback generation with templated fallback and caching
//! - `seed`: default competency catalogue and initial superuser

pub mod auth;
pub mod db;
pub mod feedback;
pub mod models;
pub mod scoring;
pub mod seed;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
