//! Identifier aliases shared across the API and database layers.

use uuid::Uuid;

pub type UserId = Uuid;
pub type EventCategoryId = Uuid;
pub type EventId = Uuid;
pub type QuotaId = Uuid;

/// First 8 characters of a UUID, for log fields
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
