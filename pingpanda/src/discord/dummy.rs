//! Dummy Discord client.
//!
//! Logs every notification instead of sending it and keeps a copy of each delivered embed.
//! Used for local development (`discord.dry_run`) and as the Discord double in tests, where
//! individual operations can be made to fail.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use super::{DiscordApi, DiscordError, DmChannel, Embed, Result};

/// An embed the dummy client accepted
#[derive(Debug, Clone, PartialEq)]
pub struct SentEmbed {
    pub channel_id: String,
    pub embed: Embed,
}

#[derive(Default)]
struct DummyState {
    sent: Vec<SentEmbed>,
    dm_calls: usize,
    fail_create_dm: bool,
    /// Number of sends that succeed before every following send fails
    fail_sends_after: Option<usize>,
}

#[derive(Clone, Default)]
pub struct DummyDiscord {
    state: Arc<Mutex<DummyState>>,
}

impl DummyDiscord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create_dm` call fail
    pub fn failing_dm(self) -> Self {
        self.state.lock().fail_create_dm = true;
        self
    }

    /// Let `successful` sends through, then fail the rest
    pub fn failing_sends_after(self, successful: usize) -> Self {
        self.state.lock().fail_sends_after = Some(successful);
        self
    }

    pub fn sent(&self) -> Vec<SentEmbed> {
        self.state.lock().sent.clone()
    }

    pub fn dm_calls(&self) -> usize {
        self.state.lock().dm_calls
    }
}

#[async_trait]
impl DiscordApi for DummyDiscord {
    async fn create_dm(&self, recipient_id: &str) -> Result<DmChannel> {
        let mut state = self.state.lock();
        state.dm_calls += 1;
        if state.fail_create_dm {
            return Err(DiscordError::Rejected(format!("cannot open DM with {recipient_id}")));
        }
        Ok(DmChannel {
            id: format!("dm-{recipient_id}"),
        })
    }

    async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_sends_after.is_some_and(|limit| state.sent.len() >= limit) {
            return Err(DiscordError::Rejected("send refused".to_string()));
        }
        tracing::info!(
            channel_id,
            title = embed.title.as_deref().unwrap_or_default(),
            description = embed.description.as_deref().unwrap_or_default(),
            "Dummy Discord delivered embed"
        );
        state.sent.push(SentEmbed {
            channel_id: channel_id.to_string(),
            embed: embed.clone(),
        });
        Ok(())
    }
}
