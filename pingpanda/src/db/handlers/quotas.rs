//! Database repository for monthly quota counters.

use crate::db::{
    errors::Result,
    models::quotas::{QuotaDBResponse, QuotaPeriod},
};
use crate::types::{QuotaId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Quota {
    pub id: QuotaId,
    pub user_id: UserId,
    pub month: i32,
    pub year: i32,
    pub count: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<Quota> for QuotaDBResponse {
    fn from(quota: Quota) -> Self {
        Self {
            id: quota.id,
            user_id: quota.user_id,
            month: quota.month,
            year: quota.year,
            count: quota.count,
            updated_at: quota.updated_at,
        }
    }
}

pub struct Quotas<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Quotas<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), month = period.month, year = period.year), err)]
    pub async fn get(&mut self, user_id: UserId, period: QuotaPeriod) -> Result<Option<QuotaDBResponse>> {
        let quota = sqlx::query_as::<_, Quota>("SELECT * FROM quotas WHERE user_id = $1 AND month = $2 AND year = $3")
            .bind(user_id)
            .bind(period.month)
            .bind(period.year)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(quota.map(Into::into))
    }

    /// Events counted against the user in `period` (0 when no row exists yet)
    pub async fn count(&mut self, user_id: UserId, period: QuotaPeriod) -> Result<i32> {
        Ok(self.get(user_id, period).await?.map(|q| q.count).unwrap_or(0))
    }

    /// Add one to the period's counter, creating it at 1 if needed. Returns the new count.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), month = period.month, year = period.year), err)]
    pub async fn increment(&mut self, user_id: UserId, period: QuotaPeriod) -> Result<i32> {
        let count: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO quotas (id, user_id, month, year, count)
            VALUES ($1, $2, $3, $4, 1)
            ON CONFLICT (user_id, month, year)
            DO UPDATE SET count = quotas.count + 1, updated_at = NOW()
            RETURNING count
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(period.month)
        .bind(period.year)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}
