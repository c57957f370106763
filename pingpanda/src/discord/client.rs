//! HTTP client for the Discord REST API.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use super::models::{CreateDmRequest, CreateMessageRequest, DmChannel, Embed};
use super::{DiscordApi, DiscordError, Result};
use crate::config::DiscordConfig;

/// Discord bot client authenticated with `Authorization: Bot <token>`
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
}

impl DiscordClient {
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(DiscordError::MissingToken)?;

        let mut auth = HeaderValue::from_str(&format!("Bot {token}")).map_err(|_| DiscordError::MissingToken)?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Turn a non-2xx response into an error carrying Discord's body
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DiscordError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DiscordApi for DiscordClient {
    #[instrument(skip(self), err)]
    async fn create_dm(&self, recipient_id: &str) -> Result<DmChannel> {
        let response = self
            .http
            .post(format!("{}/users/@me/channels", self.base_url))
            .json(&CreateDmRequest { recipient_id })
            .send()
            .await?;

        let channel: DmChannel = Self::check(response).await?.json().await?;
        debug!(channel_id = %channel.id, "Opened DM channel");
        Ok(channel)
    }

    #[instrument(skip(self, embed), fields(title = embed.title.as_deref().unwrap_or_default()), err)]
    async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/channels/{}/messages", self.base_url, channel_id))
            .json(&CreateMessageRequest { embeds: [embed] })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
