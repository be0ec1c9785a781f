//! Telegram Bot API client — long-polling `getUpdates` plus message sending.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::TransportError;
use crate::telegram::types::{ApiResponse, SendMessage, Update, User};

/// The chat transport the dispatcher talks through. `TelegramBot` is the
/// production implementation; tests substitute an in-memory fake.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch pending updates at `offset`, long-polling server-side for up to
    /// `timeout_secs` when the queue is empty.
    async fn fetch_batch(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TransportError>;

    /// Send a plain text reply.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        link_preview: bool,
    ) -> Result<(), TransportError>;

    /// Send a reply carrying extra payload (keyboards etc.).
    async fn send_structured(&self, msg: &SendMessage) -> Result<(), TransportError>;
}

/// Bot API client bound to one bot identity.
pub struct TelegramBot {
    name: String,
    token: SecretString,
    client: reqwest::Client,
}

impl TelegramBot {
    pub fn new(name: impl Into<String>, token: SecretString) -> Self {
        Self {
            name: name.into(),
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Bot username, matched against `@name` command mentions.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.token.expose_secret()
        )
    }

    async fn call<T, B>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + Sync,
    {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        let envelope: ApiResponse<T> =
            resp.json()
                .await
                .map_err(|e| TransportError::MalformedResponse {
                    method: method.to_string(),
                    reason: e.to_string(),
                })?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TransportError::ApiRejected {
                method: method.to_string(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    /// Ask the API who this token belongs to. Used as the startup identity
    /// check; a failure here is fatal.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &serde_json::json!({})).await
    }
}

#[async_trait]
impl Transport for TelegramBot {
    async fn fetch_batch(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TransportError> {
        let mut body = serde_json::json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = serde_json::json!(offset);
        }
        self.call("getUpdates", &body).await
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        link_preview: bool,
    ) -> Result<(), TransportError> {
        let mut msg = SendMessage::new(chat_id, text);
        if !link_preview {
            msg = msg.without_link_preview();
        }
        self.send_structured(&msg).await
    }

    async fn send_structured(&self, msg: &SendMessage) -> Result<(), TransportError> {
        self.call::<serde_json::Value, _>("sendMessage", msg)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                TransportError::RequestFailed { reason, .. }
                | TransportError::MalformedResponse { reason, .. } => TransportError::SendFailed {
                    chat_id: msg.chat_id,
                    reason,
                },
                TransportError::ApiRejected { description, .. } => TransportError::SendFailed {
                    chat_id: msg.chat_id,
                    reason: description,
                },
                other => other,
            })
    }
}

/// Extract the command token from a message text.
///
/// A command starts with `/` and ends at the first whitespace. An optional
/// `@name` mention after the command must match this bot's own name, or the
/// text is treated as not a command at all (group chats address commands to
/// a specific bot this way).
///
/// `"/start"` → `Some("/start")`; `"/start@OtherBot"` → `None`;
/// `"/start@MyBot now"` → `Some("/start")`; `"hello"` → `None`.
pub fn parse_command<'a>(text: &'a str, bot_name: &str) -> Option<&'a str> {
    let token = text.split_whitespace().next()?;
    if !token.starts_with('/') {
        return None;
    }
    match token.split_once('@') {
        Some((cmd, mention)) if mention == bot_name => Some(cmd),
        Some(_) => None,
        None => Some(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "SparkTest95Bot";

    #[test]
    fn bare_command() {
        assert_eq!(parse_command("/start", BOT), Some("/start"));
        assert_eq!(parse_command("/stop", BOT), Some("/stop"));
    }

    #[test]
    fn command_with_trailing_text() {
        assert_eq!(parse_command("/start please", BOT), Some("/start"));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("whatever", BOT), None);
        assert_eq!(parse_command("45.67 32.312", BOT), None);
        assert_eq!(parse_command("", BOT), None);
    }

    #[test]
    fn mention_must_match_bot_name() {
        assert_eq!(parse_command("/doStuff@SparkTest95Bot", BOT), Some("/doStuff"));
        assert_eq!(parse_command("/doStuff@BotName", BOT), None);
    }

    #[test]
    fn matching_mention_with_arguments() {
        assert_eq!(parse_command("/forecast@SparkTest95Bot now", BOT), Some("/forecast"));
    }

    #[test]
    fn leading_whitespace_is_tolerated() {
        assert_eq!(parse_command("  /start", BOT), Some("/start"));
    }
}
