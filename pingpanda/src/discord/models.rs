//! Discord REST payloads used for DM delivery.

use serde::{Deserialize, Serialize};

/// A Discord channel, as returned by `POST /users/@me/channels`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmChannel {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateDmRequest<'a> {
    pub recipient_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateMessageRequest<'a> {
    pub embeds: [&'a Embed; 1],
}

/// Rich embed attached to a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 24-bit RGB colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<i32>,
    /// RFC 3339 timestamp shown in the embed footer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// An embed carrying only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_titled_embed_omits_empty_parts() {
        let value = serde_json::to_value(Embed::titled("Hello World!!!")).unwrap();
        assert_eq!(value, json!({ "title": "Hello World!!!" }));
    }

    #[test]
    fn test_message_request_wraps_single_embed() {
        let embed = Embed {
            title: Some("🐛 Bug".to_string()),
            color: Some(0xff6b6b),
            fields: vec![EmbedField {
                name: "plan".to_string(),
                value: "PRO".to_string(),
                inline: true,
            }],
            ..Default::default()
        };
        let value = serde_json::to_value(CreateMessageRequest { embeds: [&embed] }).unwrap();
        assert_eq!(
            value,
            json!({
                "embeds": [{
                    "title": "🐛 Bug",
                    "color": 0xff6b6b,
                    "fields": [{ "name": "plan", "value": "PRO", "inline": true }]
                }]
            })
        );
    }
}
