use crate::db::errors::DbError;
use crate::db::models::users::Plan;
use crate::types::EventId;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

/// Message returned for every failure whose details must stay server-side
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided, or the credentials didn't resolve
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Authenticated, but the account is not in a state that allows the operation
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Malformed request (e.g. body is not JSON)
    #[error("{message}")]
    BadRequest { message: String },

    /// Request is well-formed but fails schema or business validation
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Requested resource not found
    #[error("{message}")]
    NotFound { message: String },

    /// Monthly event quota for the user's plan is used up
    #[error("{plan} quota exhausted")]
    QuotaExceeded { plan: Plan },

    /// The event was stored but the Discord notification could not be delivered
    #[error("Delivery failed for event {event_id}")]
    DeliveryFailed { event_id: EventId },

    /// Conflict error, e.g. for unique constraint violations
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::DeliveryFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Unauthorized".to_string()),
            Error::Forbidden { message } => message.clone(),
            Error::BadRequest { message } => message.clone(),
            Error::Validation { message } => message.clone(),
            Error::NotFound { message } => message.clone(),
            Error::QuotaExceeded { plan } => format!("You have reached your {plan} quota limit for this month"),
            Error::DeliveryFailed { .. } => "Failed to send event to Discord".to_string(),
            Error::Conflict { message } => message.clone(),
            Error::Internal { .. } => UNEXPECTED_ERROR_MESSAGE.to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { .. } => match db_err.constraint() {
                    Some("users_email_unique") => "An account with this email address already exists".to_string(),
                    Some("event_categories_user_name_unique") => "A category with this name already exists".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
            },
            Error::Other(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::DeliveryFailed { event_id } => {
                tracing::warn!(event_id = %event_id, "Event delivery error: {}", self);
            }
            Error::Database(_) | Error::Conflict { .. } => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::Validation { .. } | Error::NotFound { .. } | Error::QuotaExceeded { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let message = self.user_message();

        let body = match &self {
            Error::DeliveryFailed { event_id } => json!({
                "message": message,
                "eventId": event_id,
            }),
            _ => json!({ "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
