//! Telegram Bot API notifier.

use super::{Notifier, NotifyError};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, token: &str, chat_id: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let body = json!({ "chat_id": self.chat_id, "text": text });

        let resp = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            // The URL carries the bot token; keep it out of the error text.
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let text = match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!(status, error = %e.without_url(), "Could not read rejection body");
                    String::new()
                }
            };
            Err(NotifyError::Rejected { status, body: text })
        }
    }
}
