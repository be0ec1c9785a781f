use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use forecast_bot::config::BotConfig;
use forecast_bot::dispatcher::Dispatcher;
use forecast_bot::store::SubscriberStore;
use forecast_bot::telegram::TelegramBot;
use forecast_bot::weather::OpenWeatherClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  required: TELEGRAM_BOT_NAME, TELEGRAM_BOT_TOKEN, OPENWEATHER_API_KEY");
            std::process::exit(1);
        }
    };

    // Log to stderr and to events.log in the configured directory.
    let file_appender = tracing_appender::rolling::never(&config.log_dir, "events.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    let bot = Arc::new(TelegramBot::new(
        config.bot_name.clone(),
        config.bot_token.clone(),
    ));

    // Identity check: a bad token should fail here, not mid-loop.
    let me = match bot.get_me().await {
        Ok(me) => me,
        Err(e) => {
            tracing::error!(error = %e, "Bot identity check failed");
            std::process::exit(1);
        }
    };
    match me.username.as_deref() {
        Some(username) if username != bot.name() => {
            tracing::warn!(
                configured = bot.name(),
                actual = username,
                "Configured bot name does not match the token's account; \
                 @mention commands will use the configured name"
            );
        }
        _ => {}
    }
    tracing::info!(
        bot = me.username.as_deref().unwrap_or(&config.bot_name),
        "Connected to the Bot API"
    );

    let mut store = match SubscriberStore::load(&config.store_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Cannot load subscriber store");
            std::process::exit(1);
        }
    };

    // Stored due times may be long past after downtime; recompute them so
    // each subscriber's next slot is in the future, not a burst of stale
    // alerts on the first tick.
    let now = Utc::now().timestamp();
    for sub in store.iter_mut() {
        sub.refresh_next_due(now);
    }
    tracing::info!(
        subscribers = store.len(),
        store = %config.store_path.display(),
        "Subscriber store loaded"
    );

    let weather = Arc::new(OpenWeatherClient::new(config.weather_token.clone()));
    let mut dispatcher = Dispatcher::new(
        config.bot_name.clone(),
        bot,
        weather,
        store,
        config.poll_timeout_secs,
        config.tick_interval,
    );

    dispatcher.run().await?;
    Ok(())
}
