//! Telegram Bot API client
//!
//! Long-polls `getUpdates` for chat commands and answers through
//! `sendMessage`. The bot token is part of every method URL, so errors are
//! scrubbed of it before they leave this module.

use async_trait::async_trait;
use jupiter_arb_core::http::create_client;
use jupiter_arb_core::notify::Notifier;
use jupiter_arb_core::{ArbitrageError, ArbitrageResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Slack on top of the long-poll timeout before the HTTP client gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

pub struct TelegramClient {
    client: Client,
    api_url: String,
    token: String,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> ArbitrageResult<Self> {
        Ok(Self {
            client: create_client(poll_timeout + POLL_GRACE)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    fn scrub(&self, text: String) -> String {
        text.replace(&self.token, "<redacted>")
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> ArbitrageResult<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ArbitrageError::Telegram(self.scrub(e.to_string())))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArbitrageError::Telegram(self.scrub(e.to_string())))?;
        decode_response(method, &bytes)
    }

    /// Updates after `offset`, waiting up to `timeout_secs` for one to arrive
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> ArbitrageResult<Vec<Update>> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": timeout_secs,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;
        if !updates.is_empty() {
            debug!("Received {} updates", updates.len());
        }
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> ArbitrageResult<()> {
        let _: serde_json::Value = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }
}

/// Unwrap the `{ok, result, description}` envelope
fn decode_response<T: DeserializeOwned>(method: &str, bytes: &[u8]) -> ArbitrageResult<T> {
    let envelope: ApiResponse<T> = serde_json::from_slice(bytes)
        .map_err(|e| ArbitrageError::Decode(format!("{} response: {}", method, e)))?;
    if !envelope.ok {
        return Err(ArbitrageError::Telegram(format!(
            "{} failed: {}",
            method,
            envelope.description.as_deref().unwrap_or("unknown error")
        )));
    }
    envelope
        .result
        .ok_or_else(|| ArbitrageError::Decode(format!("{} response carried no result", method)))
}

/// Delivers trade loop notifications to one chat
pub struct ChatNotifier {
    client: Arc<TelegramClient>,
    chat_id: i64,
}

impl ChatNotifier {
    pub fn new(client: Arc<TelegramClient>, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn send_text(&self, text: &str) -> ArbitrageResult<()> {
        self.client.send_message(self.chat_id, text).await
    }
}
