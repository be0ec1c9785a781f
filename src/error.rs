//! Error types for the forecast bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Weather provider error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the Telegram transport (polling or sending).
///
/// All of these are recoverable at runtime: the dispatcher logs them and
/// skips the failed operation for the current tick.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request to {method} failed: {reason}")]
    RequestFailed { method: String, reason: String },

    #[error("Malformed response from {method}: {reason}")]
    MalformedResponse { method: String, reason: String },

    #[error("Bot API rejected {method}: {description}")]
    ApiRejected { method: String, description: String },

    #[error("Failed to send message to chat {chat_id}: {reason}")]
    SendFailed { chat_id: i64, reason: String },
}

/// Errors from the weather provider.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Forecast request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed forecast payload: {0}")]
    MalformedPayload(String),
}

/// Errors from the subscriber store.
///
/// A missing file on load is not an error (empty store); anything else here
/// is fatal at startup and logged at runtime.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read subscriber file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse subscriber file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to write subscriber file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize subscribers: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
