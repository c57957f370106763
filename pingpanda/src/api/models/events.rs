//! API models for ingested events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::events::{DeliveryStatus, EventDBResponse};
use crate::types::EventId;

/// Response to a successfully delivered event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventCreatedResponse {
    pub message: String,
    #[schema(value_type = String, format = "uuid")]
    pub event_id: EventId,
}

/// Error body for a stored event whose notification could not be delivered
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFailedResponse {
    pub message: String,
    #[schema(value_type = String, format = "uuid")]
    pub event_id: EventId,
}

/// Generic error body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

/// A stored event, as listed under its category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EventId,
    pub name: String,
    pub formatted_message: String,
    #[schema(value_type = Object)]
    pub fields: serde_json::Value,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

impl From<EventDBResponse> for EventResponse {
    fn from(event: EventDBResponse) -> Self {
        Self {
            id: event.id,
            name: event.name,
            formatted_message: event.formatted_message,
            fields: event.fields,
            delivery_status: event.delivery_status,
            created_at: event.created_at,
        }
    }
}

/// Events shown per page when the dashboard doesn't ask for a size
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page the events list will return
pub const MAX_PAGE_SIZE: i64 = 50;

/// Query string of `GET /api/categories/{name}/events`
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EventListQuery {
    /// Events to skip, newest first (default: 0)
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,

    /// Page size (default: 20, max: 50)
    #[param(default = 20, minimum = 1, maximum = 50)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

impl EventListQuery {
    /// `(skip, limit)` with negatives floored and the page size clamped
    pub fn page(&self) -> (i64, i64) {
        (
            self.skip.unwrap_or(0).max(0),
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        )
    }
}

/// A page of events
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    pub data: Vec<EventResponse>,
    pub total_count: i64,
    pub skip: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;

    fn query(raw: &str) -> EventListQuery {
        Query::<EventListQuery>::try_from_uri(&format!("/api/categories/bug/events?{raw}").parse().unwrap())
            .unwrap()
            .0
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(query("").page(), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(query("skip=-3&limit=500").page(), (0, MAX_PAGE_SIZE));
        assert_eq!(query("skip=40&limit=0").page(), (40, 1));
        assert_eq!(query("limit=5").page(), (0, 5));
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert!(Query::<EventListQuery>::try_from_uri(&"/x?limit=ten".parse().unwrap()).is_err());
    }
}
