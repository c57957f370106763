//! Persistence seam for the ingestion pipeline.
//!
//! [`EventStore`] exposes exactly the lookups and writes the pipeline performs, so the pipeline
//! can run against Postgres in production and against [`in_memory::InMemoryEventStore`] in
//! tests and local tooling.

use async_trait::async_trait;

use crate::db::errors::Result;
use crate::db::models::{
    event_categories::EventCategoryDBResponse,
    events::{DeliveryStatus, EventCreateDBRequest, EventDBResponse},
    quotas::QuotaPeriod,
    users::UserDBResponse,
};
use crate::types::{EventId, UserId};

pub mod in_memory;
pub mod postgres;


pub use in_memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;

/// Storage operations used while ingesting an event.
///
/// Implementations don't coordinate the steps: the pipeline issues them one at a time and there
/// is no transaction spanning event creation, delivery and the quota update.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Resolve an ingestion API key to its owner
    async fn user_by_api_key(&self, api_key: &str) -> Result<Option<UserDBResponse>>;

    /// Events already counted against the user in `period`
    async fn quota_count(&self, user_id: UserId, period: QuotaPeriod) -> Result<i32>;

    /// Find one of the user's categories by exact name
    async fn category_by_name(&self, user_id: UserId, name: &str) -> Result<Option<EventCategoryDBResponse>>;

    /// Record a new event in `PENDING` state
    async fn create_event(&self, request: &EventCreateDBRequest) -> Result<EventDBResponse>;

    /// Move a pending event to a terminal status.
    ///
    /// Returns false if the event was not pending.
    async fn set_delivery_status(&self, event_id: EventId, status: DeliveryStatus) -> Result<bool>;

    /// Add one delivered event to the user's counter for `period`, returning the new count
    async fn increment_quota(&self, user_id: UserId, period: QuotaPeriod) -> Result<i32>;
}
