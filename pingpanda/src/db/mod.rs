//! PostgreSQL persistence.
//!
//! Four tables back the service: `users` (credentials, plan, API key, Discord ID),
//! `event_categories` (per-user, unique by name), `events` (one row per ingested event with its
//! delivery status) and `quotas` (one counter per user and calendar month).
//!
//! [`handlers`] holds one repository per table. A repository borrows a `&mut PgConnection`, so
//! the same code runs on a pooled connection or inside a transaction:
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let owner = Users::new(&mut conn).get_by_api_key("pp_...").await?;
//! let bug = EventCategories::new(&mut conn).get_by_name(owner_id, "bug").await?;
//! ```
//!
//! Repositories return [`models`] types, never the row structs they decode into, and map sqlx
//! failures to [`errors::DbError`]. Migrations in `migrations/` run at startup through
//! [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
