//! API models for event categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::event_categories::{EventCategoryDBResponse, EventCategoryWithStats};
use crate::errors::Error;
use crate::types::EventCategoryId;

/// Largest colour value (`#ffffff`)
pub const MAX_COLOR: i64 = 0xFF_FF_FF;

/// A colour given either as `#rrggbb` or as its integer value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ColorInput {
    Int(i64),
    Hex(String),
}

impl ColorInput {
    /// Integer RGB value of this colour
    pub fn to_rgb(&self) -> Result<i32, Error> {
        let invalid = || Error::Validation {
            message: "Color must be a hex value like #ff6b6b".to_string(),
        };

        let value = match self {
            ColorInput::Int(value) => *value,
            ColorInput::Hex(hex) => {
                let digits = hex.trim().strip_prefix('#').ok_or_else(invalid)?;
                if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(invalid());
                }
                i64::from_str_radix(digits, 16).map_err(|_| invalid())?
            }
        };

        if !(0..=MAX_COLOR).contains(&value) {
            return Err(invalid());
        }
        i32::try_from(value).map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCreateRequest {
    /// Letters, numbers and hyphens
    pub name: String,
    pub color: ColorInput,
    pub emoji: Option<String>,
}

impl CategoryCreateRequest {
    /// The emoji to store, if one was given.
    ///
    /// Blank values count as absent. Anything containing ASCII letters or digits is rejected.
    pub fn validated_emoji(&self) -> Result<Option<String>, Error> {
        let Some(emoji) = self.emoji.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
            return Ok(None);
        };
        if emoji.chars().count() > 8 || emoji.chars().any(|c| c.is_ascii_alphanumeric() || c.is_whitespace()) {
            return Err(Error::Validation {
                message: "Emoji must be a single emoji".to_string(),
            });
        }
        Ok(Some(emoji.to_string()))
    }
}

/// A category with this month's activity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EventCategoryId,
    pub name: String,
    pub emoji: Option<String>,
    pub color: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Events received since the start of the month
    pub events_count: i64,
    /// Distinct field names seen on this month's events
    pub unique_field_count: i64,
    /// Time of the most recent event, ever
    pub last_ping: Option<DateTime<Utc>>,
}

impl From<EventCategoryWithStats> for CategoryResponse {
    fn from(stats: EventCategoryWithStats) -> Self {
        Self {
            events_count: stats.events_since,
            unique_field_count: stats.unique_field_count,
            last_ping: stats.last_event_at,
            ..Self::from(stats.category)
        }
    }
}

impl From<EventCategoryDBResponse> for CategoryResponse {
    fn from(category: EventCategoryDBResponse) -> Self {
        Self {
            id: category.id,
            name: category.name,
            emoji: category.emoji,
            color: category.color,
            created_at: category.created_at,
            updated_at: category.updated_at,
            events_count: 0,
            unique_field_count: 0,
            last_ping: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuickstartResponse {
    pub success: bool,
    /// Number of default categories that did not exist yet
    pub created: u64,
}
