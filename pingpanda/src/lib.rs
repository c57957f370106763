//! # pingpanda: event notifications delivered to Discord
//!
//! `pingpanda` lets an application report things that happen to it (a sale, a sign-up, a failed
//! job) with a single authenticated HTTP call, and delivers each event to the account owner as a
//! Discord direct message. Every account has a monthly event quota and a category limit set by
//! its plan.
//!
//! ## Request Flow
//!
//! #### Event ingestion (`POST /api/v1/events`)
//!
//! The client authenticates with its API key as a bearer token. The [`events::Ingestor`] checks
//! the key, the account's linked Discord ID and the monthly quota, then validates the body and
//! resolves the named category. It opens a DM channel with the owner, records the event as
//! pending, sends the embed and marks the event delivered or failed. The quota counter only moves
//! when delivery succeeds.
//!
//! #### Dashboard API (`/api/auth/*`, `/api/categories/*`, `/api/project/*`)
//!
//! Accounts log in with email and password and receive a session cookie. The dashboard manages
//! categories, links a Discord ID and reads monthly usage.
//!
//! ### Core Components
//!
//! - [`api`]: HTTP handlers and request/response models
//! - [`auth`]: API key parsing, password hashing and session cookies
//! - [`events`]: request validation, embed rendering and the ingestion pipeline
//! - [`discord`]: the Discord REST client behind the [`discord::DiscordApi`] trait
//! - [`db`]: repositories over PostgreSQL
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use pingpanda::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = pingpanda::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     pingpanda::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
mod crypto;
pub mod db;
pub mod discord;
pub mod errors;
pub mod events;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
mod test_utils;

use axum::{
    Router, http,
    http::HeaderValue,
    routing::{delete, get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::config::CorsOrigin;
use crate::discord::DiscordApi;
use crate::events::store::{EventStore, PostgresEventStore};
use crate::openapi::ApiDoc;

pub use config::Config;
pub use types::{EventCategoryId, EventId, UserId};

/// Application state shared across all request handlers.
///
/// `store` and `discord` are the two seams of the ingestion pipeline. Production wires them to
/// Postgres and the Discord REST API; tests swap in in-memory doubles.
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool.clone())
///     .config(config)
///     .store(Arc::new(PostgresEventStore::new(pool)))
///     .discord(discord::create_client(&config.discord)?)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub store: Arc<dyn EventStore>,
    pub discord: Arc<dyn DiscordApi>,
}

/// Get the pingpanda database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect to the configured database and bring the schema up to date
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let Some(database_url) = config.database_url.as_deref() else {
        anyhow::bail!("database_url is not configured. Set DATABASE_URL or add database_url to the config file.");
    };

    let settings = &config.database.pool;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
        .connect(database_url)
        .await?;

    migrator().run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.cors;
    let mut origins = Vec::new();
    for origin in &cors_config.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            // Browsers send origins without the trailing slash `Url` adds
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router: ingestion, dashboard API, docs, CORS, optional Prometheus
/// metrics at `/internal/metrics` and request tracing.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/api/v1/events", post(api::handlers::events::create_event))
        // Accounts
        .route("/api/auth/register", post(api::handlers::auth::register))
        .route("/api/auth/login", post(api::handlers::auth::login))
        .route("/api/auth/logout", post(api::handlers::auth::logout))
        .route("/api/auth/me", get(api::handlers::auth::me))
        .route("/api/auth/api-key", post(api::handlers::auth::regenerate_api_key))
        // Categories
        .route(
            "/api/categories",
            get(api::handlers::categories::list_categories).post(api::handlers::categories::create_category),
        )
        .route("/api/categories/quickstart", post(api::handlers::categories::quickstart))
        .route("/api/categories/{name}", delete(api::handlers::categories::delete_category))
        .route("/api/categories/{name}/events", get(api::handlers::categories::list_category_events))
        // Project
        .route("/api/project/setDiscordID", post(api::handlers::project::set_discord_id))
        .route("/api/project/getUsage", get(api::handlers::project::get_usage))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(api_routes)
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let mut router = router.layer(create_cors_layer(&state.config)?);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// A fully wired server.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs migrations and builds the
///    Discord client selected by configuration
/// 2. **Serve**: [`Application::serve`] binds the configured address and handles requests until
///    the shutdown future resolves, then closes the pool and flushes telemetry
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting pingpanda with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        let discord = discord::create_client(&config.discord)?;

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .store(Arc::new(PostgresEventStore::new(pool.clone())))
            .discord(discord)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("pingpanda listening on http://{}", bind_addr);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
