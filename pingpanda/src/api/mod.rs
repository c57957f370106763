//! HTTP surface of the service.
//!
//! [`handlers`] are the axum route functions; [`models`] are the JSON bodies they accept and
//! return. Two kinds of caller use it:
//!
//! - client applications posting events to `/api/v1/events` with their API key
//! - the dashboard, logged in with a session cookie, under `/api/auth`, `/api/categories` and
//!   `/api/project`
//!
//! The OpenAPI document for all of it is served at `/docs`.

pub mod handlers;
pub mod models;
