//! API models for the project procedures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest Discord ID accepted (snowflakes are at most 20 digits)
pub const MAX_DISCORD_ID_LENGTH: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetDiscordIdRequest {
    /// Discord user ID to deliver notifications to. An empty value unlinks the account.
    pub discord_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Current month's consumption against the user's plan
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub category_used: i64,
    pub category_limit: i64,
    pub events_used: i32,
    pub events_limit: i32,
    /// When the event counter resets (first instant of next month, UTC)
    pub reset_date: DateTime<Utc>,
}
