//! JWT session token creation and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{api::models::users::CurrentUser, config::Config, errors::Error, types::UserId};

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,   // Subject (user ID)
    pub email: String, // User email
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
}

impl SessionClaims {
    pub fn new(user: &CurrentUser, config: &Config) -> Self {
        let now = Utc::now();
        let exp = now + config.auth.jwt_expiry;

        Self {
            sub: user.id,
            email: user.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

fn secret_key(config: &Config) -> Result<&str, Error> {
    config.secret_key.as_deref().ok_or_else(|| Error::Internal {
        operation: "JWT sessions: secret_key is required".to_string(),
    })
}

/// Create a JWT token for a user session
pub fn create_session_token(user: &CurrentUser, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(user, config);
    let key = EncodingKey::from_secret(secret_key(config)?.as_bytes());

    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify and decode a JWT session token
pub fn verify_session_token(token: &str, config: &Config) -> Result<CurrentUser, Error> {
    let key = DecodingKey::from_secret(secret_key(config)?.as_bytes());

    let token_data = decode::<SessionClaims>(token, &key, &Validation::default()).map_err(|e| match e.kind() {
        // Client errors (401): malformed, forged or expired tokens
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::ExpiredSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::ImmatureSignature
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        _ => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },
    })?;

    Ok(CurrentUser::from(token_data.claims))
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, config: &Config) -> String {
    let session = &config.auth.session;
    format!(
        "{}={}; Path=/; HttpOnly;{} SameSite=Strict; Max-Age={}",
        session.cookie_name,
        token,
        if session.cookie_secure { " Secure;" } else { "" },
        config.auth.jwt_expiry.as_secs()
    )
}

/// `Set-Cookie` value that clears the session
pub fn expired_session_cookie(config: &Config) -> String {
    let session = &config.auth.session;
    format!(
        "{}=; Path=/; HttpOnly;{} SameSite=Strict; Max-Age=0",
        session.cookie_name,
        if session.cookie_secure { " Secure;" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;
    use uuid::Uuid;

    fn create_test_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "panda@example.com".to_string(),
        }
    }

    #[test]
    fn test_create_and_verify_session_token() {
        let config = create_test_config();
        let user = create_test_user();

        let token = create_session_token(&user, &config).unwrap();
        let verified = verify_session_token(&token, &config).unwrap();

        assert_eq!(verified, user);
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let mut config = create_test_config();
        let token = create_session_token(&create_test_user(), &config).unwrap();

        config.secret_key = Some("different-secret".to_string());
        let result = verify_session_token(&token, &config);
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[test]
    fn test_verify_expired_token() {
        let config = create_test_config();
        let user = create_test_user();
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id,
            email: user.email,
            exp: (now - chrono::Duration::seconds(3600)).timestamp(),
            iat: (now - chrono::Duration::seconds(7200)).timestamp(),
        };
        let key = EncodingKey::from_secret(config.secret_key.as_deref().unwrap().as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(matches!(verify_session_token(&token, &config), Err(Error::Unauthenticated { .. })));
    }

    #[test]
    fn test_verify_malformed_token() {
        let config = create_test_config();
        for token in ["not.a.token", "invalid", "", "too.many.parts.in.this.token"] {
            assert!(
                matches!(verify_session_token(token, &config), Err(Error::Unauthenticated { .. })),
                "Expected Unauthenticated error for token: {token}"
            );
        }
    }

    #[test]
    fn test_missing_secret_is_internal() {
        let mut config = create_test_config();
        config.secret_key = None;
        assert!(matches!(create_session_token(&create_test_user(), &config), Err(Error::Internal { .. })));
    }

    #[test]
    fn test_cookies() {
        let mut config = create_test_config();
        config.auth.session.cookie_secure = true;
        assert_eq!(
            session_cookie("abc", &config),
            format!(
                "pingpanda_session=abc; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
                config.auth.jwt_expiry.as_secs()
            )
        );
        assert_eq!(
            expired_session_cookie(&config),
            "pingpanda_session=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0"
        );

        config.auth.session.cookie_secure = false;
        assert_eq!(
            expired_session_cookie(&config),
            "pingpanda_session=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0"
        );
    }
}
