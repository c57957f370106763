use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        categories::{CategoryCreateRequest, CategoryResponse, QuickstartResponse},
        events::{ErrorResponse, EventListQuery, EventListResponse, EventResponse},
        project::SuccessResponse,
        users::CurrentUser,
    },
    db::{
        handlers::{EventCategories, Events, Repository, Users},
        models::{event_categories::EventCategoryCreateDBRequest, quotas::QuotaPeriod, users::UserDBResponse},
    },
    errors::Error,
    events::validation::validate_category_name,
    types::UserId,
};

/// Categories created by the quickstart: name, emoji, colour
pub const QUICKSTART_CATEGORIES: [(&str, &str, i32); 3] = [("bug", "🐛", 0xff6b6b), ("sale", "💰", 0xffeb3b), ("question", "🤔", 0x6c5ce7)];

fn category_not_found(name: &str) -> Error {
    Error::NotFound {
        message: format!("You dont have a category named \"{name}\""),
    }
}

/// List the caller's categories with this month's activity
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories, most recently updated first", body = [CategoryResponse]),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<CategoryResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let since = QuotaPeriod::containing(Utc::now()).starts_at();

    let categories = EventCategories::new(&mut conn).list_with_stats(current_user.id, since).await?;

    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// Create a category, within the plan's category limit
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryCreateRequest,
    tag = "categories",
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Category limit for the plan reached", body = ErrorResponse),
        (status = 409, description = "A category with this name already exists", body = ErrorResponse),
        (status = 422, description = "Invalid name, colour or emoji", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CategoryCreateRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), Error> {
    let name = request.name.trim().to_string();
    validate_category_name(&name)?;
    let color = request.color.to_rgb()?;
    let emoji = request.validated_emoji()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = user_or_unauthenticated(&mut conn, current_user.id).await?;

    let limit = state.config.plans.limits_for(user.plan).max_event_categories;
    if EventCategories::new(&mut conn).count_for_user(user.id).await? >= limit {
        return Err(Error::Forbidden {
            message: format!("You have reached the {} plan limit of {limit} categories", user.plan),
        });
    }

    let category = EventCategories::new(&mut conn)
        .create(&EventCategoryCreateDBRequest {
            user_id: user.id,
            name,
            emoji,
            color,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// Delete a category by name. Its events are kept, detached from the category.
#[utoipa::path(
    delete,
    path = "/api/categories/{name}",
    tag = "categories",
    params(("name" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Category deleted", body = SuccessResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "No category with this name", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(name): Path<String>,
) -> Result<Json<SuccessResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if !EventCategories::new(&mut conn).delete_by_name(current_user.id, &name).await? {
        return Err(category_not_found(&name));
    }

    Ok(Json(SuccessResponse { success: true }))
}

/// Create the default bug / sale / question categories the caller doesn't have yet
#[utoipa::path(
    post,
    path = "/api/categories/quickstart",
    tag = "categories",
    responses(
        (status = 200, description = "Default categories present", body = QuickstartResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn quickstart(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<QuickstartResponse>, Error> {
    let requests: Vec<_> = QUICKSTART_CATEGORIES
        .iter()
        .map(|(name, emoji, color)| EventCategoryCreateDBRequest {
            user_id: current_user.id,
            name: name.to_string(),
            emoji: Some(emoji.to_string()),
            color: *color,
        })
        .collect();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = EventCategories::new(&mut conn).create_missing(&requests).await?;

    Ok(Json(QuickstartResponse { success: true, created }))
}

/// Page through a category's events, newest first
#[utoipa::path(
    get,
    path = "/api/categories/{name}/events",
    tag = "categories",
    params(("name" = String, Path, description = "Category name"), EventListQuery),
    responses(
        (status = 200, description = "Events of the category", body = EventListResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "No category with this name", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_category_events(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(name): Path<String>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<EventListResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let category = EventCategories::new(&mut conn)
        .get_by_name(current_user.id, &name)
        .await?
        .ok_or_else(|| category_not_found(&name))?;

    let (skip, limit) = query.page();
    let mut events = Events::new(&mut conn);
    let data = events.list_for_category(category.id, skip, limit).await?;
    let total_count = events.count_for_category(category.id).await?;

    Ok(Json(EventListResponse {
        data: data.into_iter().map(EventResponse::from).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn user_or_unauthenticated(conn: &mut sqlx::PgConnection, user_id: UserId) -> Result<UserDBResponse, Error> {
    // A valid session can outlive its account
    Users::new(conn)
        .get_by_id(user_id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })
}


#[cfg(all(test, feature = "postgres-tests"))]
mod postgres_tests {
    use super::QUICKSTART_CATEGORIES;
    use crate::test_utils::{create_test_app, create_test_user, session_cookie_header};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_quickstart_is_idempotent(pool: PgPool) {
        let user = create_test_user(&pool, None).await;
        let server = create_test_app(pool);
        let cookie = session_cookie_header(user.id, &user.email);

        let first: Value = server.post("/api/categories/quickstart").add_header("cookie", &cookie).await.json();
        assert_eq!(first["created"], 3);
        let second: Value = server.post("/api/categories/quickstart").add_header("cookie", &cookie).await.json();
        assert_eq!(second["created"], 0);

        let listed: Vec<Value> = server.get("/api/categories").add_header("cookie", &cookie).await.json();
        assert_eq!(listed.len(), QUICKSTART_CATEGORIES.len());
        let bug = listed.iter().find(|c| c["name"] == "bug").unwrap();
        assert_eq!(bug["color"], 0xff6b6b);
        assert_eq!(bug["emoji"], "🐛");
        assert_eq!(bug["eventsCount"], 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_enforces_limit_and_uniqueness(pool: PgPool) {
        let user = create_test_user(&pool, None).await;
        let server = create_test_app(pool);
        let cookie = session_cookie_header(user.id, &user.email);

        let response = server
            .post("/api/categories")
            .add_header("cookie", &cookie)
            .json(&json!({"name": "signup", "color": "#00ff00", "emoji": "🎉"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["color"], 0x00ff00);

        let response = server
            .post("/api/categories")
            .add_header("cookie", &cookie)
            .json(&json!({"name": "signup", "color": 255}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        response.assert_json(&json!({"message": "A category with this name already exists"}));

        for name in ["a", "b"] {
            server
                .post("/api/categories")
                .add_header("cookie", &cookie)
                .json(&json!({"name": name, "color": 0}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        // Free plan allows three categories
        server
            .post("/api/categories")
            .add_header("cookie", &cookie)
            .json(&json!({"name": "c", "color": 0}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_and_list_events_of_missing_category(pool: PgPool) {
        let user = create_test_user(&pool, None).await;
        let server = create_test_app(pool);
        let cookie = session_cookie_header(user.id, &user.email);

        server.post("/api/categories/quickstart").add_header("cookie", &cookie).await;

        let events: Value = server.get("/api/categories/bug/events?limit=5").add_header("cookie", &cookie).await.json();
        assert_eq!(events["totalCount"], 0);
        assert_eq!(events["limit"], 5);

        server.delete("/api/categories/bug").add_header("cookie", &cookie).await.assert_status_ok();
        server
            .delete("/api/categories/bug")
            .add_header("cookie", &cookie)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/api/categories/bug/events")
            .add_header("cookie", &cookie)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
