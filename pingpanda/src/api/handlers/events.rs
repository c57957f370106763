use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::events::{DeliveryFailedResponse, ErrorResponse, EventCreatedResponse},
    errors::Error,
    events::{Ingestor, validation::EventRequest},
};

/// Submit an event and deliver it to the account owner's Discord DMs
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = EventRequest,
    tag = "events",
    responses(
        (status = 200, description = "Event delivered", body = EventCreatedResponse),
        (status = 400, description = "Body is not valid JSON", body = ErrorResponse),
        (status = 401, description = "Missing, malformed or unknown API key", body = ErrorResponse),
        (status = 403, description = "No Discord ID linked to the account", body = ErrorResponse),
        (status = 404, description = "No category with this name", body = ErrorResponse),
        (status = 422, description = "Body does not match the event schema", body = ErrorResponse),
        (status = 429, description = "Monthly event quota reached", body = ErrorResponse),
        (status = 500, description = "Event stored but Discord delivery failed", body = DeliveryFailedResponse),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_event(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<Json<EventCreatedResponse>, Error> {
    // A non-ASCII header can't be a valid bearer token; treat it as malformed
    let authorization = headers.get(AUTHORIZATION).map(|value| value.to_str().unwrap_or_default());

    let event_id = Ingestor::new(
        state.store.as_ref(),
        state.discord.as_ref(),
        &state.config.plans,
        state.config.discord.send_probe,
    )
    .ingest(authorization, &body, Utc::now())
    .await?;

    Ok(Json(EventCreatedResponse {
        message: "Event created successfully".to_string(),
        event_id,
    }))
}

#[cfg(test)]
mod tests {
    use crate::db::models::{events::DeliveryStatus, quotas::QuotaPeriod};
    use crate::discord::dummy::DummyDiscord;
    use crate::events::store::InMemoryEventStore;
    use crate::test_utils::{create_test_server, test_category, test_user};
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::{Value, json};

    struct Fixture {
        server: axum_test::TestServer,
        store: InMemoryEventStore,
        discord: DummyDiscord,
        bearer: String,
        user_id: uuid::Uuid,
    }

    fn fixture(discord_id: Option<&str>, discord: DummyDiscord) -> Fixture {
        let store = InMemoryEventStore::new();
        let user = test_user(discord_id);
        store.insert_category(test_category(user.id, "signup", Some("🎉")));
        store.insert_user(user.clone());

        Fixture {
            server: create_test_server(store.clone(), discord.clone()),
            store,
            discord,
            bearer: format!("Bearer {}", user.api_key),
            user_id: user.id,
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_event_delivered() {
        let f = fixture(Some("123456789"), DummyDiscord::new());

        let response = f
            .server
            .post("/api/v1/events")
            .add_header("authorization", &f.bearer)
            .json(&json!({"category": "signup", "fields": {"plan": "PRO"}}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Event created successfully");

        let events = f.store.events();
        assert_eq!(body["eventId"], events[0].id.to_string());
        assert_eq!(events[0].delivery_status, DeliveryStatus::Delivered);
        assert_eq!(f.store.quota(f.user_id, QuotaPeriod::containing(Utc::now())), 1);
        assert_eq!(f.discord.sent().len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_header_is_401() {
        let f = fixture(Some("123456789"), DummyDiscord::new());

        let response = f.server.post("/api/v1/events").json(&json!({"category": "signup"})).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"message": "Unauthorized"}));
        assert_eq!(f.store.calls(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_malformed_header_is_401() {
        let f = fixture(Some("123456789"), DummyDiscord::new());

        let response = f
            .server
            .post("/api/v1/events")
            .add_header("authorization", "Basic dXNlcjpwYXNz")
            .json(&json!({"category": "signup"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"message": "Invalid auth header format. Expected: 'Bearer [API_KEY]'"}));
        assert_eq!(f.store.calls(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_unlinked_discord_is_403() {
        let f = fixture(None, DummyDiscord::new());

        let response = f
            .server
            .post("/api/v1/events")
            .add_header("authorization", &f.bearer)
            .json(&json!({"category": "signup"}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        response.assert_json(&json!({"message": "Please enter your Discord ID in your account settings"}));
    }

    #[test_log::test(tokio::test)]
    async fn test_quota_exhausted_is_429() {
        let f = fixture(Some("123456789"), DummyDiscord::new());
        f.store.set_quota(f.user_id, QuotaPeriod::containing(Utc::now()), 100);

        let response = f
            .server
            .post("/api/v1/events")
            .add_header("authorization", &f.bearer)
            .json(&json!({"category": "signup"}))
            .await;

        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        response.assert_json(&json!({"message": "You have reached your FREE quota limit for this month"}));
        assert!(f.store.events().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_json_is_400_and_schema_error_is_422() {
        let f = fixture(Some("123456789"), DummyDiscord::new());

        let response = f
            .server
            .post("/api/v1/events")
            .add_header("authorization", &f.bearer)
            .text("{not json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"message": "Invalid JSON request body"}));

        let response = f
            .server
            .post("/api/v1/events")
            .add_header("authorization", &f.bearer)
            .json(&json!({"category": "has space"}))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_category_is_404() {
        let f = fixture(Some("123456789"), DummyDiscord::new());

        let response = f
            .server
            .post("/api/v1/events")
            .add_header("authorization", &f.bearer)
            .json(&json!({"category": "refund"}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"message": "You dont have a category named \"refund\""}));
        assert!(f.store.events().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_delivery_failure_is_500_with_event_id() {
        let f = fixture(Some("123456789"), DummyDiscord::new().failing_sends_after(1));

        let response = f
            .server
            .post("/api/v1/events")
            .add_header("authorization", &f.bearer)
            .json(&json!({"category": "signup"}))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["message"], "Failed to send event to Discord");

        let events = f.store.events();
        assert_eq!(body["eventId"], events[0].id.to_string());
        assert_eq!(events[0].delivery_status, DeliveryStatus::Failed);
        assert_eq!(f.store.quota(f.user_id, QuotaPeriod::containing(Utc::now())), 0);
    }
}
