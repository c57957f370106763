//! Database repository for event categories.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::event_categories::{
        EventCategoryCreateDBRequest, EventCategoryDBResponse, EventCategoryUpdateDBRequest, EventCategoryWithStats,
    },
};
use crate::types::{EventCategoryId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct EventCategory {
    pub id: EventCategoryId,
    pub user_id: UserId,
    pub name: String,
    pub emoji: Option<String>,
    pub color: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventCategory> for EventCategoryDBResponse {
    fn from(category: EventCategory) -> Self {
        Self {
            id: category.id,
            user_id: category.user_id,
            name: category.name,
            emoji: category.emoji,
            color: category.color,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct EventCategoryStatsRow {
    #[sqlx(flatten)]
    category: EventCategory,
    events_since: i64,
    unique_field_count: i64,
    last_event_at: Option<DateTime<Utc>>,
}

pub struct EventCategories<'c> {
    db: &'c mut PgConnection,
}

impl<'c> EventCategories<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Find a user's category by its exact name
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_by_name(&mut self, user_id: UserId, name: &str) -> Result<Option<EventCategoryDBResponse>> {
        let category = sqlx::query_as::<_, EventCategory>("SELECT * FROM event_categories WHERE user_id = $1 AND name = $2")
            .bind(user_id)
            .bind(name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(category.map(EventCategoryDBResponse::from))
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn count_for_user(&mut self, user_id: UserId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_categories WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn delete_by_name(&mut self, user_id: UserId, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM event_categories WHERE user_id = $1 AND name = $2")
            .bind(user_id)
            .bind(name)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert categories, skipping names the user already has. Returns how many were created.
    #[instrument(skip(self, requests), fields(count = requests.len()), err)]
    pub async fn create_missing(&mut self, requests: &[EventCategoryCreateDBRequest]) -> Result<u64> {
        let mut created = 0;
        for request in requests {
            let result = sqlx::query(
                r#"
                INSERT INTO event_categories (id, user_id, name, emoji, color)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, name) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(request.user_id)
            .bind(&request.name)
            .bind(&request.emoji)
            .bind(request.color)
            .execute(&mut *self.db)
            .await?;
            created += result.rows_affected();
        }
        Ok(created)
    }

    /// All of a user's categories with event activity since `since`, newest category first
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_with_stats(&mut self, user_id: UserId, since: DateTime<Utc>) -> Result<Vec<EventCategoryWithStats>> {
        let rows = sqlx::query_as::<_, EventCategoryStatsRow>(
            r#"
            SELECT
                c.*,
                (SELECT COUNT(*) FROM events e
                    WHERE e.event_category_id = c.id AND e.created_at >= $2) AS events_since,
                (SELECT COUNT(DISTINCT k) FROM events e, jsonb_object_keys(e.fields) AS k
                    WHERE e.event_category_id = c.id AND e.created_at >= $2) AS unique_field_count,
                (SELECT MAX(e.created_at) FROM events e
                    WHERE e.event_category_id = c.id) AS last_event_at
            FROM event_categories c
            WHERE c.user_id = $1
            ORDER BY c.updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EventCategoryWithStats {
                category: row.category.into(),
                events_since: row.events_since,
                unique_field_count: row.unique_field_count,
                last_event_at: row.last_event_at,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for EventCategories<'c> {
    type CreateRequest = EventCategoryCreateDBRequest;
    type UpdateRequest = EventCategoryUpdateDBRequest;
    type Response = EventCategoryDBResponse;
    type Id = EventCategoryId;

    #[instrument(skip(self, request), fields(name = %request.name, user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, EventCategory>(
            r#"
            INSERT INTO event_categories (id, user_id, name, emoji, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.name)
        .bind(&request.emoji)
        .bind(request.color)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(category.into())
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, EventCategory>("SELECT * FROM event_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(category.map(Into::into))
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM event_categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, EventCategory>(
            r#"
            UPDATE event_categories SET
                emoji = COALESCE($2, emoji),
                color = COALESCE($3, color),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.emoji)
        .bind(request.color)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(category.into())
    }
}
