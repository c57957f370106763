//! Request body parsing for event ingestion.
//!
//! Parsing happens in two stages so the caller can tell the failures apart: bytes that are not
//! JSON at all are a 400, JSON that doesn't match the event schema is a 422.

use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::errors::Error;

pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON request body";

/// Body of `POST /api/v1/events`
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct EventRequest {
    /// Name of an existing category (letters, numbers and hyphens)
    pub category: String,
    /// Extra key/value pairs shown on the notification. Values must be strings, numbers or booleans.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub fields: Option<Map<String, Value>>,
    /// Overrides the default notification text
    #[serde(default)]
    pub description: Option<String>,
}

impl EventRequest {
    /// Fields rendered for display, in the order the client sent them
    pub fn display_fields(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .flatten()
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect()
    }

    /// Fields as stored on the event row (`{}` when absent)
    pub fn fields_json(&self) -> Value {
        Value::Object(self.fields.clone().unwrap_or_default())
    }
}

/// Parse and validate an ingestion request body
pub fn parse_event_request(body: &[u8]) -> Result<EventRequest, Error> {
    let value: Value = serde_json::from_slice(body).map_err(|_| Error::BadRequest {
        message: INVALID_JSON_MESSAGE.to_string(),
    })?;

    if !value.is_object() {
        return Err(Error::Validation {
            message: "Expected a JSON object".to_string(),
        });
    }

    let request: EventRequest = serde_json::from_value(value).map_err(|e| Error::Validation { message: e.to_string() })?;

    validate_category_name(&request.category)?;

    if let Some(fields) = &request.fields {
        for (key, value) in fields {
            if !matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
                return Err(Error::Validation {
                    message: format!("fields.{key}: expected string, number or boolean"),
                });
            }
        }
    }

    Ok(request)
}

/// Category names are non-empty and limited to ASCII letters, digits and hyphens
pub fn validate_category_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Category name is required.".to_string(),
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::Validation {
            message: "Category name can only contain letters, numbers or hyphens.".to_string(),
        });
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Whole floats read better without a trailing ".0"
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
