//! Repository implementations for database access.
//!
//! - [`Users`]: accounts, API key lookup, Discord linking
//! - [`EventCategories`]: per-user categories and their activity stats
//! - [`Events`]: event rows and delivery status transitions
//! - [`Quotas`]: monthly counters with atomic increment

pub mod event_categories;
pub mod events;
pub mod quotas;
pub mod repository;
pub mod users;

pub use event_categories::EventCategories;
pub use events::Events;
pub use quotas::Quotas;
pub use repository::Repository;
pub use users::Users;
