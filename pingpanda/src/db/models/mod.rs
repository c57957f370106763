//! Database record models matching table schemas.
//!
//! These structs are what repositories in [`crate::db::handlers`] accept and return. They are
//! kept separate from the API models in [`crate::api::models`] so storage and wire
//! representations can evolve independently.
//!
//! - [`users`]: accounts, plan, API key and linked Discord ID
//! - [`event_categories`]: named event classifications with emoji and colour
//! - [`events`]: ingested events and their delivery status
//! - [`quotas`]: per-user monthly event counters

pub mod event_categories;
pub mod events;
pub mod quotas;
pub mod users;
