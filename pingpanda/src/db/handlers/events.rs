//! Database repository for events.

use crate::db::{
    errors::Result,
    models::events::{DeliveryStatus, EventCreateDBRequest, EventDBResponse},
};
use crate::types::{EventCategoryId, EventId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Event {
    pub id: EventId,
    pub user_id: UserId,
    pub event_category_id: Option<EventCategoryId>,
    pub name: String,
    pub formatted_message: String,
    pub fields: serde_json::Value,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventDBResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            user_id: event.user_id,
            event_category_id: event.event_category_id,
            name: event.name,
            formatted_message: event.formatted_message,
            fields: event.fields,
            delivery_status: event.delivery_status,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

pub struct Events<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Events<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Record a new event in `PENDING` state
    #[instrument(skip(self, request), fields(name = %request.name, user_id = %abbrev_uuid(&request.user_id)), err)]
    pub async fn create(&mut self, request: &EventCreateDBRequest) -> Result<EventDBResponse> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (id, user_id, event_category_id, name, formatted_message, fields, delivery_status)
            VALUES ($1, $2, $3, $4, $5, $6, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.event_category_id)
        .bind(&request.name)
        .bind(&request.formatted_message)
        .bind(&request.fields)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(event.into())
    }

    #[instrument(skip(self), fields(event_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: EventId) -> Result<Option<EventDBResponse>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(event.map(Into::into))
    }

    /// Move a pending event to a terminal delivery status.
    ///
    /// Returns false if the event doesn't exist or has already left `PENDING`.
    #[instrument(skip(self), fields(event_id = %abbrev_uuid(&id), status = %status), err)]
    pub async fn set_delivery_status(&mut self, id: EventId, status: DeliveryStatus) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events SET delivery_status = $2, updated_at = NOW()
            WHERE id = $1 AND delivery_status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Events of one category, newest first
    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&category_id)), err)]
    pub async fn list_for_category(&mut self, category_id: EventCategoryId, skip: i64, limit: i64) -> Result<Vec<EventDBResponse>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE event_category_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(category_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(events.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&category_id)), err)]
    pub async fn count_for_category(&mut self, category_id: EventCategoryId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE event_category_id = $1")
            .bind(category_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(all(test, feature = "postgres-tests"))]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_category, create_test_user};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_event_starts_pending(pool: PgPool) {
        let user = create_test_user(&pool, Some("1234")).await;
        let category = create_test_category(&pool, user.id, "bug").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let event = repo
            .create(&EventCreateDBRequest {
                user_id: user.id,
                event_category_id: category.id,
                name: "bug".to_string(),
                formatted_message: "🐛 Bug\n\nA new bug event has occurred".to_string(),
                fields: serde_json::json!({"plan": "PRO"}),
            })
            .await
            .unwrap();

        assert_eq!(event.delivery_status, DeliveryStatus::Pending);
        assert_eq!(event.fields["plan"], "PRO");
        assert_eq!(repo.count_for_category(category.id).await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delivery_status_transitions_once(pool: PgPool) {
        let user = create_test_user(&pool, Some("1234")).await;
        let category = create_test_category(&pool, user.id, "sale").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let event = repo
            .create(&EventCreateDBRequest {
                user_id: user.id,
                event_category_id: category.id,
                name: "sale".to_string(),
                formatted_message: "💰 Sale".to_string(),
                fields: serde_json::json!({}),
            })
            .await
            .unwrap();

        assert!(repo.set_delivery_status(event.id, DeliveryStatus::Delivered).await.unwrap());
        assert!(!repo.set_delivery_status(event.id, DeliveryStatus::Failed).await.unwrap());

        let stored = repo.get_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(stored.delivery_status, DeliveryStatus::Delivered);
    }
}
