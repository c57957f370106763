//! In-memory [`EventStore`] implementation.
//!
//! Keeps users, categories, events and quota counters in maps behind a single lock. Nothing
//! survives a restart. Every trait call is counted, which lets tests assert that a request was
//! rejected before touching storage.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use super::EventStore;
use crate::db::errors::{DbError, Result};
use crate::db::models::{
    event_categories::EventCategoryDBResponse,
    events::{DeliveryStatus, EventCreateDBRequest, EventDBResponse},
    quotas::QuotaPeriod,
    users::UserDBResponse,
};
use crate::types::{EventCategoryId, EventId, UserId};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, UserDBResponse>,
    categories: HashMap<EventCategoryId, EventCategoryDBResponse>,
    events: HashMap<EventId, EventDBResponse>,
    quotas: HashMap<(UserId, QuotaPeriod), i32>,
}

#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    tables: Arc<RwLock<Tables>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserDBResponse) {
        self.tables.write().users.insert(user.id, user);
    }

    pub fn insert_category(&self, category: EventCategoryDBResponse) {
        self.tables.write().categories.insert(category.id, category);
    }

    pub fn set_quota(&self, user_id: UserId, period: QuotaPeriod, count: i32) {
        self.tables.write().quotas.insert((user_id, period), count);
    }

    /// Current counter for a period, without counting as a store call
    pub fn quota(&self, user_id: UserId, period: QuotaPeriod) -> i32 {
        self.tables.read().quotas.get(&(user_id, period)).copied().unwrap_or(0)
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> Vec<EventDBResponse> {
        let mut events: Vec<_> = self.tables.read().events.values().cloned().collect();
        events.sort_by_key(|e| e.created_at);
        events
    }

    /// Number of [`EventStore`] calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn user_by_api_key(&self, api_key: &str) -> Result<Option<UserDBResponse>> {
        self.record_call();
        Ok(self.tables.read().users.values().find(|u| u.api_key == api_key).cloned())
    }

    async fn quota_count(&self, user_id: UserId, period: QuotaPeriod) -> Result<i32> {
        self.record_call();
        Ok(self.quota(user_id, period))
    }

    async fn category_by_name(&self, user_id: UserId, name: &str) -> Result<Option<EventCategoryDBResponse>> {
        self.record_call();
        Ok(self
            .tables
            .read()
            .categories
            .values()
            .find(|c| c.user_id == user_id && c.name == name)
            .cloned())
    }

    async fn create_event(&self, request: &EventCreateDBRequest) -> Result<EventDBResponse> {
        self.record_call();
        let mut tables = self.tables.write();

        if !tables.users.contains_key(&request.user_id) || !tables.categories.contains_key(&request.event_category_id) {
            return Err(DbError::ForeignKeyViolation {
                constraint: None,
                message: "event references a missing user or category".to_string(),
            });
        }

        let now = Utc::now();
        let event = EventDBResponse {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            event_category_id: Some(request.event_category_id),
            name: request.name.clone(),
            formatted_message: request.formatted_message.clone(),
            fields: request.fields.clone(),
            delivery_status: DeliveryStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn set_delivery_status(&self, event_id: EventId, status: DeliveryStatus) -> Result<bool> {
        self.record_call();
        let mut tables = self.tables.write();
        match tables.events.get_mut(&event_id) {
            Some(event) if !event.delivery_status.is_terminal() => {
                event.delivery_status = status;
                event.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_quota(&self, user_id: UserId, period: QuotaPeriod) -> Result<i32> {
        self.record_call();
        let mut tables = self.tables.write();
        let count = tables.quotas.entry((user_id, period)).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}
