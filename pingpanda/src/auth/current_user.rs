use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts},
};
use tracing::{instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    errors::{Error, Result},
};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No valid session cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but unreadable
fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name == cookie_name
        {
            match session::verify_session_token(value, config) {
                Ok(user) => return Some(Ok(user)),
                // Expired or forged tokens are treated like a missing cookie
                Err(e) => trace!("Ignoring invalid session cookie: {e}"),
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(result) => result,
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}
