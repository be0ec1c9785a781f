//! Serde types for the slice of the Bot API wire format the bot uses.

use serde::{Deserialize, Serialize};

// ── Incoming ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

/// One queued update. `update_id` is the monotonically increasing sequence
/// id the polling cursor is derived from.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub channel_post: Option<Message>,
}

/// Envelope every Bot API call returns: `ok` plus either `result` or a
/// human-readable `description` of the failure.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

// ── Outgoing ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub request_contact: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub request_location: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub resize_keyboard: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub one_time_keyboard: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboardRemove {
    pub remove_keyboard: bool,
}

impl ReplyKeyboardRemove {
    pub fn new() -> Self {
        Self {
            remove_keyboard: true,
        }
    }
}

impl Default for ReplyKeyboardRemove {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
}

/// Parameters of the `sendMessage` method.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            disable_web_page_preview: false,
            reply_markup: None,
        }
    }

    pub fn without_link_preview(mut self) -> Self {
        self.disable_web_page_preview = true;
        self
    }

    pub fn with_reply_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_deserializes_minimal_message() {
        let raw = r#"{
            "update_id": 42,
            "message": {
                "message_id": 7,
                "from": {"id": 1, "is_bot": false, "first_name": "A", "username": "alice"},
                "chat": {"id": 100, "type": "private"},
                "text": "hello"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.update_id, 42);
        let msg = update.message.unwrap();
        assert_eq!(msg.chat.id, 100);
        assert_eq!(msg.text.as_deref(), Some("hello"));
        assert_eq!(msg.from.unwrap().id, 1);
    }

    #[test]
    fn update_tolerates_missing_text_and_from() {
        let raw = r#"{
            "update_id": 43,
            "message": {
                "message_id": 8,
                "chat": {"id": 100, "type": "private"}
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let msg = update.message.unwrap();
        assert!(msg.text.is_none());
        assert!(msg.from.is_none());
    }

    #[test]
    fn api_response_carries_error_description() {
        let raw = r#"{"ok": false, "description": "Unauthorized"}"#;
        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.description.as_deref(), Some("Unauthorized"));
        assert!(resp.result.is_none());
    }

    #[test]
    fn send_message_omits_defaults() {
        let msg = SendMessage::new(5, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"chat_id": 5, "text": "hi"}));
    }

    #[test]
    fn send_message_serializes_keyboard_remove() {
        let msg = SendMessage::new(5, "hi")
            .with_reply_markup(ReplyMarkup::Remove(ReplyKeyboardRemove::new()));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["reply_markup"], serde_json::json!({"remove_keyboard": true}));
    }

    #[test]
    fn send_message_link_preview_flag() {
        let msg = SendMessage::new(5, "hi").without_link_preview();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["disable_web_page_preview"], serde_json::json!(true));
    }
}
