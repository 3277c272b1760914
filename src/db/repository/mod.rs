//! Repository Module
//!
//! CRUD and transactional operations over the SQLite tables. Repositories are
//! free functions taking the pool; the sale repository owns the only
//! multi-statement transaction in the system.

// Auth
pub mod user;

// Catalog
pub mod category;
pub mod product;

// Sales
pub mod sale;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Expected business rejection: a line asked for more than the product
    /// has. Carries the product name so callers can surface it.
    #[error("Not enough stock for product {0}")]
    InsufficientStock(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        // Check-then-insert duplicate detection can race a concurrent
        // insert; the UNIQUE index then fires here and is still a 409,
        // not a storage fault.
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate("Resource already exists".into());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
