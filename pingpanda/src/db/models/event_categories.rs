//! Database models for event categories.

use crate::types::{EventCategoryId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a category
#[derive(Debug, Clone)]
pub struct EventCategoryCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
    pub emoji: Option<String>,
    pub color: i32,
}

/// Database request for updating a category's display attributes
#[derive(Debug, Clone, Default)]
pub struct EventCategoryUpdateDBRequest {
    pub emoji: Option<String>,
    pub color: Option<i32>,
}

/// Database response for a category
#[derive(Debug, Clone, PartialEq)]
pub struct EventCategoryDBResponse {
    pub id: EventCategoryId,
    pub user_id: UserId,
    pub name: String,
    pub emoji: Option<String>,
    pub color: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category together with its event activity since a cutoff
#[derive(Debug, Clone)]
pub struct EventCategoryWithStats {
    pub category: EventCategoryDBResponse,
    pub events_since: i64,
    pub unique_field_count: i64,
    pub last_event_at: Option<DateTime<Utc>>,
}
