//! Database models for users.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Subscription plan, which decides the monthly limits a user gets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plan_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => write!(f, "FREE"),
            Plan::Pro => write!(f, "PRO"),
        }
    }
}

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub password_hash: Option<String>,
    pub api_key: String,
    pub plan: Plan,
}

/// Database request for updating a user.
///
/// `discord_id` is doubly optional: `None` leaves it untouched, `Some(None)` unlinks it.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub plan: Option<Plan>,
    pub discord_id: Option<Option<String>>,
    pub api_key: Option<String>,
}

/// Database response for a user
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub password_hash: Option<String>,
    pub plan: Plan,
    pub api_key: String,
    pub discord_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserDBResponse {
    /// The linked Discord ID, if one is set and non-blank
    pub fn linked_discord_id(&self) -> Option<&str> {
        self.discord_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}
