//! Discord delivery abstraction.
//!
//! The [`DiscordApi`] trait is the only thing the ingestion pipeline knows about Discord: open a
//! DM channel with a user and post an embed into it. [`client::DiscordClient`] talks to the real
//! REST API; [`dummy::DummyDiscord`] logs and records deliveries instead.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::DiscordConfig;

pub mod client;
pub mod dummy;
pub mod models;

pub use models::{DmChannel, Embed, EmbedField};

/// Create the Discord client selected by configuration
pub fn create_client(config: &DiscordConfig) -> Result<Arc<dyn DiscordApi>> {
    if config.dry_run {
        tracing::warn!("Discord dry-run enabled: notifications will be logged, not sent");
        return Ok(Arc::new(dummy::DummyDiscord::new()));
    }
    Ok(Arc::new(client::DiscordClient::new(config)?))
}

/// Result type for Discord operations
pub type Result<T> = std::result::Result<T, DiscordError>;

/// Errors that can occur while talking to Discord
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Discord bot token is not configured")]
    MissingToken,

    #[error("Discord request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Discord API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Discord delivery rejected: {0}")]
    Rejected(String),
}

/// Operations the ingestion pipeline needs from Discord
#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// Open (or reuse) the DM channel with a Discord user
    async fn create_dm(&self, recipient_id: &str) -> Result<DmChannel>;

    /// Post a single embed into a channel
    async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<()>;
}
