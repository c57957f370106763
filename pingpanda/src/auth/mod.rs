//! Authentication.
//!
//! PingPanda has two kinds of credentials:
//!
//! ## Ingestion API keys
//!
//! Every account owns one API key (`pp_...`) which clients send to `POST /api/v1/events` as
//! `Authorization: Bearer <key>`. The key is resolved by the ingestion pipeline itself, see
//! [`api_key`] for the header parsing.
//!
//! ## Dashboard sessions
//!
//! The dashboard routes authenticate with a JWT carried in an HTTP-only cookie, issued on
//! registration and login:
//!
//! ```ignore
//! use pingpanda::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.email)
//! }
//! ```
//!
//! # Modules
//!
//! - [`api_key`]: `Bearer` header parsing for ingestion
//! - [`current_user`]: Extractor for the session-authenticated user
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification

pub mod api_key;
pub mod current_user;
pub mod password;
pub mod session;
