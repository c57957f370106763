//! Database models for events.

use crate::types::{EventCategoryId, EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Delivery lifecycle of an event's Discord notification.
///
/// Every event starts `Pending` and moves to `Delivered` or `Failed` exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "delivery_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeliveryStatus::Pending)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "PENDING"),
            DeliveryStatus::Delivered => write!(f, "DELIVERED"),
            DeliveryStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Database request for recording a new (pending) event
#[derive(Debug, Clone)]
pub struct EventCreateDBRequest {
    pub user_id: UserId,
    pub event_category_id: EventCategoryId,
    pub name: String,
    pub formatted_message: String,
    pub fields: serde_json::Value,
}

/// Database response for an event
#[derive(Debug, Clone)]
pub struct EventDBResponse {
    pub id: EventId,
    pub user_id: UserId,
    pub event_category_id: Option<EventCategoryId>,
    pub name: String,
    pub formatted_message: String,
    pub fields: serde_json::Value,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
