use crate::config::PublisherConfig;
use crate::SendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outbound messaging capability used by the publisher
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Delivers `text` to `destination`
    async fn send(&self, destination: &str, text: &str) -> Result<(), SendError>;
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    message_id: i64,
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramMessenger {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramMessenger {
    pub fn new(api_base: &str, token: &str) -> Result<Self, SendError> {
        if token.trim().is_empty() {
            return Err(SendError::NotConfigured("bot token is blank".to_string()));
        }
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    pub fn from_config(config: &PublisherConfig) -> Result<Self, SendError> {
        Self::new(&config.api_base, &config.bot_token)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &Value,
    ) -> Result<Option<T>, SendError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: Option<ApiResponse<T>> = serde_json::from_str(&text).ok();
        match parsed {
            Some(api) if api.ok => Ok(api.result),
            Some(api) if status.is_success() => Err(SendError::Rejected(
                api.description.unwrap_or_else(|| "ok=false".to_string()),
            )),
            _ if status.is_success() => Err(SendError::Rejected(format!(
                "unreadable response to {method}"
            ))),
            _ => Err(SendError::Http {
                status: status.as_u16(),
                body: text,
            }),
        }
    }

    /// Long-polls for updates and answers `/ping` with `pong` until cancelled
    pub async fn respond_to_ping(&self, cancel: CancellationToken) {
        let mut offset: Option<i64> = None;
        tracing::info!("Ping responder started");

        loop {
            let body = json!({
                "offset": offset,
                "timeout": 30,
                "allowed_updates": ["message"],
            });
            let poll = tokio::select! {
                _ = cancel.cancelled() => break,
                poll = self.call::<Vec<Update>>("getUpdates", &body) => poll,
            };

            let updates = match poll {
                Ok(updates) => updates.unwrap_or_default(),
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(Duration::from_secs(5)) => continue,
                    }
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                let Some(message) = update.message else {
                    continue;
                };
                if !is_ping(message.text.as_deref().unwrap_or_default()) {
                    continue;
                }
                let reply = json!({
                    "chat_id": message.chat.id,
                    "text": "pong",
                    "reply_to_message_id": message.message_id,
                });
                if let Err(e) = self.call::<Value>("sendMessage", &reply).await {
                    tracing::warn!(error = %e, "Failed to answer ping");
                }
            }
        }

        tracing::info!("Ping responder stopped");
    }
}

/// `/ping`, optionally addressed as `/ping@botname`
fn is_ping(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .map(|command| command == "/ping" || command.starts_with("/ping@"))
        .unwrap_or(false)
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, destination: &str, text: &str) -> Result<(), SendError> {
        let body = json!({
            "chat_id": destination,
            "text": text,
            "disable_web_page_preview": true,
        });
        self.call::<Value>("sendMessage", &body).await?;
        Ok(())
    }
}
