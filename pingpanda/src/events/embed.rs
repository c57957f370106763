//! Building the Discord notification for an event.

use chrono::{DateTime, SecondsFormat, Utc};

use super::validation::EventRequest;
use crate::db::models::event_categories::EventCategoryDBResponse;
use crate::discord::{Embed, EmbedField};

/// Emoji used when a category doesn't define one
pub const DEFAULT_EMOJI: &str = "🔔";

/// Title of the greeting embed sent before each notification
pub const PROBE_TITLE: &str = "Hello World!!!";

/// What gets sent to Discord and what gets stored on the event row
#[derive(Debug, Clone, PartialEq)]
pub struct EventNotification {
    pub embed: Embed,
    pub formatted_message: String,
}

pub fn probe_embed() -> Embed {
    Embed::titled(PROBE_TITLE)
}

/// Render the notification for `request` in `category`, stamped with `now`
pub fn build_notification(category: &EventCategoryDBResponse, request: &EventRequest, now: DateTime<Utc>) -> EventNotification {
    let emoji = category.emoji.as_deref().filter(|e| !e.is_empty()).unwrap_or(DEFAULT_EMOJI);
    let title = format!("{emoji} {}", capitalize(&category.name));
    let description = request
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("A new {} event has occurred", category.name));

    let fields = request
        .display_fields()
        .into_iter()
        .map(|(name, value)| EmbedField { name, value, inline: true })
        .collect();

    EventNotification {
        formatted_message: format!("{title}\n\n{description}"),
        embed: Embed {
            title: Some(title),
            description: Some(description),
            color: Some(category.color),
            timestamp: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            fields,
        },
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
