use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        events::ErrorResponse,
        users::{
            ApiKeyResponse, AuthResponse, AuthSuccessResponse, CurrentUser, LoginRequest, LoginResponse, LogoutResponse, RegisterRequest,
            RegisterResponse, UserResponse,
        },
    },
    auth::{password, session},
    crypto::generate_api_key,
    db::{
        handlers::{Repository, Users},
        models::users::{Plan, UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
};

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input or registration disabled", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<RegisterResponse, Error> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    let email = request.email.trim().to_lowercase();
    if !email.contains('@') || email.len() > 254 {
        return Err(Error::BadRequest {
            message: "A valid email address is required".to_string(),
        });
    }

    let password_config = &state.config.auth.password;
    password::validate_password_length(&request.password, password_config.min_length, password_config.max_length)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    if user_repo.get_user_by_email(&email).await?.is_some() {
        return Err(Error::Conflict {
            message: "An account with this email address already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            email,
            password_hash: Some(password_hash),
            api_key: generate_api_key(),
            plan: Plan::Free,
        })
        .await?;
    tracing::info!(user_id = %created_user.id, "Registered new user");

    let user_response = UserResponse::from(created_user);
    let token = session::create_session_token(&CurrentUser::from(&user_response), &state.config)?;

    Ok(RegisterResponse {
        auth_response: AuthResponse {
            user: user_response,
            message: "Registration successful".to_string(),
        },
        cookie: session::session_cookie(&token, &state.config),
    })
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let invalid = || Error::Unauthenticated {
        message: Some(INVALID_CREDENTIALS_MESSAGE.to_string()),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_user_by_email(&request.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;
    let hash = user.password_hash.clone().ok_or_else(invalid)?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password;
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(invalid());
    }

    let user_response = UserResponse::from(user);
    let token = session::create_session_token(&CurrentUser::from(&user_response), &state.config)?;

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: user_response,
            message: "Login successful".to_string(),
        },
        cookie: session::session_cookie(&token, &state.config),
    })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie: session::expired_session_cookie(&state.config),
    })
}

/// The logged-in account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_by_id(current_user.id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })?;

    Ok(Json(UserResponse::from(user)))
}

/// Replace the ingestion API key. The previous key stops working immediately.
#[utoipa::path(
    post,
    path = "/api/auth/api-key",
    tag = "authentication",
    responses(
        (status = 200, description = "New API key", body = ApiKeyResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn regenerate_api_key(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<ApiKeyResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                api_key: Some(generate_api_key()),
                ..Default::default()
            },
        )
        .await?;
    tracing::info!(user_id = %user.id, "Regenerated API key");

    Ok(Json(ApiKeyResponse { api_key: user.api_key }))
}
