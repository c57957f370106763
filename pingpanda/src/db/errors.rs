use sqlx::error::DatabaseError;
use thiserror::Error;

/// Database failures, split into the cases handlers turn into client errors and everything else
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Entity not found")]
    NotFound,

    /// Duplicate email, API key, category name or quota period
    #[error("Unique constraint violation on {}: {message}", .constraint.as_deref().unwrap_or("unknown constraint"))]
    UniqueViolation { constraint: Option<String>, message: String },

    /// A row points at a user or category that doesn't exist
    #[error("Foreign key constraint violation on {}: {message}", .constraint.as_deref().unwrap_or("unknown constraint"))]
    ForeignKeyViolation { constraint: Option<String>, message: String },

    /// Colour range, Discord ID length, quota month or count bounds
    #[error("Check constraint violation on {}: {message}", .constraint.as_deref().unwrap_or("unknown constraint"))]
    CheckViolation { constraint: Option<String>, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// Name of the violated constraint, for constraint errors
    pub fn constraint(&self) -> Option<&str> {
        match self {
            DbError::UniqueViolation { constraint, .. }
            | DbError::ForeignKeyViolation { constraint, .. }
            | DbError::CheckViolation { constraint, .. } => constraint.as_deref(),
            DbError::NotFound | DbError::Other(_) => None,
        }
    }
}

fn details(db_err: &dyn DatabaseError) -> (Option<String>, String) {
    (db_err.constraint().map(str::to_string), db_err.message().to_string())
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            return match err {
                sqlx::Error::RowNotFound => DbError::NotFound,
                other => DbError::Other(other.into()),
            };
        };

        let (constraint, message) = details(db_err.as_ref());
        if db_err.is_unique_violation() {
            DbError::UniqueViolation { constraint, message }
        } else if db_err.is_foreign_key_violation() {
            DbError::ForeignKeyViolation { constraint, message }
        } else if db_err.is_check_violation() {
            DbError::CheckViolation { constraint, message }
        } else {
            DbError::Other(err.into())
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
