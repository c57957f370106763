//! API models for accounts and sessions.

use axum::{
    Json,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::users::{Plan, UserDBResponse};
use crate::types::UserId;

/// The session-authenticated caller, as carried in the session JWT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
}

/// Account details shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub plan: Plan,
    /// Linked Discord user ID, if any
    pub discord_id: Option<String>,
    /// Key for `Authorization: Bearer` on `POST /api/v1/events`
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            email: user.email,
            plan: user.plan,
            discord_id: user.discord_id,
            api_key: user.api_key,
            created_at: user.created_at,
        }
    }
}

impl From<&UserResponse> for CurrentUser {
    fn from(user: &UserResponse) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// Response to API key regeneration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key: String,
}

/// Registration result plus the session cookie to set
pub struct RegisterResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, [(SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}

/// Login result plus the session cookie to set
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, [(SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}

/// Logout result plus the expired cookie that clears the session
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, [(SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}
