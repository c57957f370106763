//! Event ingestion: authenticate the API key, enforce the monthly quota, resolve the category and
//! deliver the notification to the owner's Discord DMs.
//!
//! Checks run in a fixed order and each one short-circuits. The header is inspected before any
//! storage access, and the Discord link is checked before the quota or the body, so a client
//! always sees the most fundamental problem with its request first.
//!
//! Once the category is resolved the pipeline has side effects:
//!
//! 1. open the DM channel (and send the greeting probe, if enabled)
//! 2. store the event as `PENDING`
//! 3. send the notification embed
//! 4. mark the event `DELIVERED` and count it against the quota, or mark it `FAILED`
//!
//! A failed delivery is never retried and never counted.

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{info, instrument, warn};

use super::embed::{build_notification, probe_embed};
use super::store::EventStore;
use super::validation::parse_event_request;
use crate::auth::api_key::{INVALID_API_KEY_MESSAGE, parse_bearer};
use crate::config::PlansConfig;
use crate::db::errors::Result as DbResult;
use crate::db::models::{
    events::{DeliveryStatus, EventCreateDBRequest},
    quotas::QuotaPeriod,
};
use crate::discord::DiscordApi;
use crate::errors::{Error, Result};
use crate::types::{EventId, UserId, abbrev_uuid};

pub const DISCORD_NOT_LINKED_MESSAGE: &str = "Please enter your Discord ID in your account settings";

/// Runs one ingestion request against a store and a Discord client
pub struct Ingestor<'a> {
    store: &'a dyn EventStore,
    discord: &'a dyn DiscordApi,
    plans: &'a PlansConfig,
    send_probe: bool,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a dyn EventStore, discord: &'a dyn DiscordApi, plans: &'a PlansConfig, send_probe: bool) -> Self {
        Self {
            store,
            discord,
            plans,
            send_probe,
        }
    }

    /// Ingest one event, returning the id of the delivered event.
    ///
    /// `authorization` is the raw `Authorization` header value and `body` the raw request body.
    /// `now` decides both the quota period and the embed timestamp.
    #[instrument(skip_all, fields(user_id, category, event_id))]
    pub async fn ingest(&self, authorization: Option<&str>, body: &[u8], now: DateTime<Utc>) -> Result<EventId> {
        let api_key = parse_bearer(authorization)?;

        let user = self.store.user_by_api_key(api_key).await?.ok_or_else(|| Error::Unauthenticated {
            message: Some(INVALID_API_KEY_MESSAGE.to_string()),
        })?;
        tracing::Span::current().record("user_id", abbrev_uuid(&user.id).as_str());

        let discord_id = user.linked_discord_id().ok_or_else(|| Error::Forbidden {
            message: DISCORD_NOT_LINKED_MESSAGE.to_string(),
        })?;

        let period = QuotaPeriod::containing(now);
        let limits = self.plans.limits_for(user.plan);
        let used = self.store.quota_count(user.id, period).await?;
        if used >= limits.max_events_per_month {
            counter!("pingpanda_quota_rejections_total").increment(1);
            info!(plan = %user.plan, used, limit = limits.max_events_per_month, "Monthly event quota exhausted");
            return Err(Error::QuotaExceeded { plan: user.plan });
        }

        let request = parse_event_request(body)?;
        tracing::Span::current().record("category", request.category.as_str());

        let category = self
            .store
            .category_by_name(user.id, &request.category)
            .await?
            .ok_or_else(|| Error::NotFound {
                message: format!("You dont have a category named \"{}\"", request.category),
            })?;

        let channel = self.discord.create_dm(discord_id).await.map_err(|e| Error::Internal {
            operation: format!("open Discord DM channel: {e}"),
        })?;

        if self.send_probe {
            self.discord
                .send_embed(&channel.id, &probe_embed())
                .await
                .map_err(|e| Error::Internal {
                    operation: format!("send Discord probe message: {e}"),
                })?;
        }

        let notification = build_notification(&category, &request, now);
        let event = self
            .store
            .create_event(&EventCreateDBRequest {
                user_id: user.id,
                event_category_id: category.id,
                name: category.name.clone(),
                formatted_message: notification.formatted_message,
                fields: request.fields_json(),
            })
            .await?;
        tracing::Span::current().record("event_id", abbrev_uuid(&event.id).as_str());

        if let Err(e) = self.discord.send_embed(&channel.id, &notification.embed).await {
            warn!(event_id = %event.id, error = %e, "Discord delivery failed");
            return Err(self.fail_delivery(event.id).await);
        }

        match self.record_delivery(event.id, user.id, period).await {
            Ok(count) => {
                counter!("pingpanda_events_ingested_total", "outcome" => "delivered").increment(1);
                info!(event_id = %event.id, quota_used = count, "Event delivered");
                Ok(event.id)
            }
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Failed to record Discord delivery");
                Err(self.fail_delivery(event.id).await)
            }
        }
    }

    /// Mark a sent event delivered and count it, returning the user's new count for the period
    async fn record_delivery(&self, event_id: EventId, user_id: UserId, period: QuotaPeriod) -> DbResult<i32> {
        if !self.store.set_delivery_status(event_id, DeliveryStatus::Delivered).await? {
            warn!(event_id = %event_id, "Event was no longer pending when marking it delivered");
        }
        self.store.increment_quota(user_id, period).await
    }

    /// Mark the event failed and build the error returned to the client.
    ///
    /// The status update only applies to events still `PENDING`, so an event already marked
    /// delivered keeps its status.
    async fn fail_delivery(&self, event_id: EventId) -> Error {
        counter!("pingpanda_events_ingested_total", "outcome" => "failed").increment(1);
        if let Err(db_err) = self.store.set_delivery_status(event_id, DeliveryStatus::Failed).await {
            tracing::error!(event_id = %event_id, error = %db_err, "Failed to mark event as failed");
        }
        Error::DeliveryFailed { event_id }
    }
}
