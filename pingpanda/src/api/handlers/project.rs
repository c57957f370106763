use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        events::ErrorResponse,
        project::{MAX_DISCORD_ID_LENGTH, SetDiscordIdRequest, SuccessResponse, UsageResponse},
        users::CurrentUser,
    },
    db::{
        errors::DbError,
        handlers::{EventCategories, Quotas, Repository, Users},
        models::{quotas::QuotaPeriod, users::UserUpdateDBRequest},
    },
    errors::Error,
};

/// Link (or unlink) the Discord account that receives notifications
#[utoipa::path(
    post,
    path = "/api/project/setDiscordID",
    request_body = SetDiscordIdRequest,
    tag = "project",
    responses(
        (status = 200, description = "Discord ID updated", body = SuccessResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 422, description = "Discord ID too long", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn set_discord_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<SetDiscordIdRequest>,
) -> Result<Json<SuccessResponse>, Error> {
    if request.discord_id.chars().count() > MAX_DISCORD_ID_LENGTH {
        return Err(Error::Validation {
            message: format!("Discord ID must be at most {MAX_DISCORD_ID_LENGTH} characters"),
        });
    }

    let discord_id = request.discord_id.trim();
    let discord_id = (!discord_id.is_empty()).then(|| discord_id.to_string());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Users::new(&mut conn)
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                discord_id: Some(discord_id),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| match e {
            // Session outlived the account
            DbError::NotFound => Error::Unauthenticated { message: None },
            other => Error::Database(other),
        })?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Report this month's usage against the caller's plan
#[utoipa::path(
    get,
    path = "/api/project/getUsage",
    tag = "project",
    responses(
        (status = 200, description = "Current usage", body = UsageResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_usage(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UsageResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = Users::new(&mut conn)
        .get_by_id(current_user.id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })?;

    let period = QuotaPeriod::containing(Utc::now());
    let events_used = Quotas::new(&mut conn).count(user.id, period).await?;
    let category_used = EventCategories::new(&mut conn).count_for_user(user.id).await?;
    let limits = state.config.plans.limits_for(user.plan);

    Ok(Json(UsageResponse {
        category_used,
        category_limit: limits.max_event_categories,
        events_used,
        events_limit: limits.max_events_per_month,
        reset_date: period.resets_at(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::discord::dummy::DummyDiscord;
    use crate::events::store::InMemoryEventStore;
    use crate::test_utils::{create_test_server, session_cookie_header};
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    #[test_log::test(tokio::test)]
    async fn test_requires_session() {
        let server = create_test_server(InMemoryEventStore::new(), DummyDiscord::new());

        server.get("/api/project/getUsage").await.assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/api/project/setDiscordID")
            .json(&json!({"discordId": "123"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[test_log::test(tokio::test)]
    async fn test_discord_id_too_long_is_422() {
        let server = create_test_server(InMemoryEventStore::new(), DummyDiscord::new());

        let response = server
            .post("/api/project/setDiscordID")
            .add_header("cookie", session_cookie_header(Uuid::new_v4(), "panda@example.com"))
            .json(&json!({"discordId": "1".repeat(21)}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        response.assert_json(&json!({"message": "Discord ID must be at most 20 characters"}));
    }
}
