//! HTTP request handlers for all API endpoints.
//!
//! - [`events`]: Event ingestion (`POST /api/v1/events`)
//! - [`auth`]: Registration, login, logout and API key rotation
//! - [`categories`]: Event category management and event history
//! - [`project`]: Discord linking and monthly usage
//!
//! Handlers return [`crate::errors::Error`], which converts into the matching status code and a
//! JSON `{ "message": ... }` body.

pub mod auth;
pub mod categories;
pub mod events;
pub mod project;
