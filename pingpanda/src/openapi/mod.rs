//! OpenAPI documentation for the HTTP API.
//!
//! Served as JSON at `/api-docs/openapi.json` and rendered at `/docs`. Ingestion authenticates
//! with a bearer API key; every other route uses the session cookie set by login.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{api, db, events};

/// Security schemes: bearer API key for ingestion, session cookie for the dashboard
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .description(Some(
                            "API key authentication. Include your key in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_API_KEY\n```\n\n\
                            Your key is shown on the dashboard and can be regenerated there.",
                        ))
                        .build(),
                ),
            );
            components.security_schemes.insert(
                "CookieAuth".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("pingpanda_session"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PingPanda API",
        description = "Send events from your app and receive them as Discord direct messages.",
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::events::create_event,
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        api::handlers::auth::regenerate_api_key,
        api::handlers::categories::list_categories,
        api::handlers::categories::create_category,
        api::handlers::categories::delete_category,
        api::handlers::categories::quickstart,
        api::handlers::categories::list_category_events,
        api::handlers::project::set_discord_id,
        api::handlers::project::get_usage,
    ),
    components(
        schemas(
            events::validation::EventRequest,
            api::models::events::EventCreatedResponse,
            api::models::events::DeliveryFailedResponse,
            api::models::events::ErrorResponse,
            api::models::events::EventResponse,
            api::models::events::EventListResponse,
            api::models::users::UserResponse,
            api::models::users::RegisterRequest,
            api::models::users::LoginRequest,
            api::models::users::AuthResponse,
            api::models::users::AuthSuccessResponse,
            api::models::users::ApiKeyResponse,
            api::models::categories::ColorInput,
            api::models::categories::CategoryCreateRequest,
            api::models::categories::CategoryResponse,
            api::models::categories::QuickstartResponse,
            api::models::project::SetDiscordIdRequest,
            api::models::project::SuccessResponse,
            api::models::project::UsageResponse,
            db::models::users::Plan,
            db::models::events::DeliveryStatus,
        )
    ),
    tags(
        (name = "events", description = "Event ingestion. Authenticate with your API key as a bearer token."),
        (name = "authentication", description = "Account registration, login and API key management."),
        (name = "categories", description = "Event categories and their recent events."),
        (name = "project", description = "Discord linking and monthly usage."),
    )
)]
pub struct ApiDoc;
