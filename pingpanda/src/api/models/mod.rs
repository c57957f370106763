//! API request and response data models.
//!
//! API models are kept separate from the database models so the wire format (camelCase, no
//! password hashes, colours as integers) can evolve independently of storage. Every model is
//! annotated with `utoipa` for the generated OpenAPI document.
//!
//! - [`users`]: Accounts, sessions and API keys
//! - [`events`]: Ingestion responses, stored events and their paging query
//! - [`categories`]: Event categories and their statistics
//! - [`project`]: Discord linking and usage

pub mod categories;
pub mod events;
pub mod project;
pub mod users;
