//! Postgres-backed [`EventStore`] built on the repositories in [`crate::db::handlers`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::EventStore;
use crate::db::errors::Result;
use crate::db::handlers::{EventCategories, Events, Quotas, Users};
use crate::db::models::{
    event_categories::EventCategoryDBResponse,
    events::{DeliveryStatus, EventCreateDBRequest, EventDBResponse},
    quotas::QuotaPeriod,
    users::UserDBResponse,
};
use crate::types::{EventId, UserId};

/// Each operation checks a connection out of the pool for its own duration.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn user_by_api_key(&self, api_key: &str) -> Result<Option<UserDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).get_by_api_key(api_key).await
    }

    async fn quota_count(&self, user_id: UserId, period: QuotaPeriod) -> Result<i32> {
        let mut conn = self.pool.acquire().await?;
        Quotas::new(&mut conn).count(user_id, period).await
    }

    async fn category_by_name(&self, user_id: UserId, name: &str) -> Result<Option<EventCategoryDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        EventCategories::new(&mut conn).get_by_name(user_id, name).await
    }

    async fn create_event(&self, request: &EventCreateDBRequest) -> Result<EventDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Events::new(&mut conn).create(request).await
    }

    async fn set_delivery_status(&self, event_id: EventId, status: DeliveryStatus) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Events::new(&mut conn).set_delivery_status(event_id, status).await
    }

    async fn increment_quota(&self, user_id: UserId, period: QuotaPeriod) -> Result<i32> {
        let mut conn = self.pool.acquire().await?;
        Quotas::new(&mut conn).increment(user_id, period).await
    }
}
