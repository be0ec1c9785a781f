//! Telegram transport: wire types, Bot API client, update consumption.

pub mod api;
pub mod consumer;
pub mod types;

pub use api::{parse_command, TelegramBot, Transport};
pub use consumer::UpdateConsumer;
