//! Ingestion API key extraction from the `Authorization` header.

use crate::errors::Error;

pub const INVALID_HEADER_FORMAT_MESSAGE: &str = "Invalid auth header format. Expected: 'Bearer [API_KEY]'";
pub const INVALID_API_KEY_MESSAGE: &str = "Invalid Api key";

/// Pull the API key out of a `Bearer <key>` header value.
///
/// Purely syntactic: the key is not looked up here, so a rejection never costs a database query.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, Error> {
    let header = header.ok_or(Error::Unauthenticated { message: None })?;

    let key = header.strip_prefix("Bearer ").ok_or_else(|| Error::Unauthenticated {
        message: Some(INVALID_HEADER_FORMAT_MESSAGE.to_string()),
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Unauthenticated {
            message: Some(INVALID_API_KEY_MESSAGE.to_string()),
        });
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(header: Option<&str>) -> String {
        match parse_bearer(header) {
            Err(e @ Error::Unauthenticated { .. }) => e.user_message(),
            other => panic!("expected unauthenticated for {header:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_extracts_key() {
        assert_eq!(parse_bearer(Some("Bearer pp_abc")).unwrap(), "pp_abc");
        assert_eq!(parse_bearer(Some("Bearer   pp_abc  ")).unwrap(), "pp_abc");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(rejection(None), "Unauthorized");
    }

    #[test]
    fn test_wrong_scheme() {
        for header in ["Basic abc", "bearer pp_abc", "Bearerpp_abc", "", "pp_abc"] {
            assert_eq!(rejection(Some(header)), INVALID_HEADER_FORMAT_MESSAGE, "{header:?}");
        }
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(rejection(Some("Bearer ")), INVALID_API_KEY_MESSAGE);
        assert_eq!(rejection(Some("Bearer    ")), INVALID_API_KEY_MESSAGE);
    }
}
