//! Configuration — loaded once at startup from the environment.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default path of the persisted subscriber file.
const DEFAULT_STORE_PATH: &str = "./data/subscribers.json";

/// Default directory for the `events.log` file layer.
const DEFAULT_LOG_DIR: &str = ".";

/// Default pause between dispatcher ticks, in milliseconds.
const DEFAULT_TICK_MS: u64 = 500;

/// Default server-side long-poll timeout for getUpdates, in seconds.
const DEFAULT_POLL_TIMEOUT_SECS: u32 = 2;

/// Bot configuration.
///
/// Missing or malformed values are fatal: the process logs the error and
/// exits non-zero without starting the loop.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot username, used to match `@name` command mentions.
    pub bot_name: String,
    /// Telegram Bot API token.
    pub bot_token: SecretString,
    /// OpenWeather API key.
    pub weather_token: SecretString,
    /// Path of the persisted subscriber file.
    pub store_path: PathBuf,
    /// Directory for the file log layer.
    pub log_dir: PathBuf,
    /// Pause between dispatcher ticks.
    pub tick_interval: Duration,
    /// Server-side long-poll timeout for getUpdates.
    pub poll_timeout_secs: u32,
}

impl BotConfig {
    /// Load the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_name = require_env("TELEGRAM_BOT_NAME")?;
        let bot_token = SecretString::from(require_env("TELEGRAM_BOT_TOKEN")?);
        let weather_token = SecretString::from(require_env("OPENWEATHER_API_KEY")?);

        let store_path = std::env::var("FORECAST_BOT_STORE")
            .unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string())
            .into();
        let log_dir = std::env::var("FORECAST_BOT_LOG_DIR")
            .unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string())
            .into();

        let tick_interval = Duration::from_millis(parse_env_or(
            "FORECAST_BOT_TICK_MS",
            DEFAULT_TICK_MS,
        )?);
        let poll_timeout_secs =
            parse_env_or("FORECAST_BOT_POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)?;

        Ok(Self {
            bot_name,
            bot_token,
            weather_token,
            store_path,
            log_dir,
            tick_interval,
            poll_timeout_secs,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}
