//! Alert scheduling — decides, once per tick, who gets a forecast now.

use std::sync::Arc;

use crate::store::SubscriberStore;
use crate::telegram::Transport;
use crate::weather::{render_forecast, ForecastProvider};

/// Scans the store each tick and delivers forecasts to due subscribers.
pub struct AlertScheduler {
    weather: Arc<dyn ForecastProvider>,
    transport: Arc<dyn Transport>,
}

impl AlertScheduler {
    pub fn new(weather: Arc<dyn ForecastProvider>, transport: Arc<dyn Transport>) -> Self {
        Self { weather, transport }
    }

    /// One scheduling pass: fire every due subscriber, then push their due
    /// times to the next slot. Returns how many alerts fired.
    ///
    /// A failed forecast fetch or send still advances the due time — one
    /// attempt per slot, the next chance is 24 h later. Errors are logged
    /// and never escape the tick.
    pub async fn tick(&self, store: &mut SubscriberStore, now: i64) -> usize {
        let due: Vec<i64> = collect_due(store, now);
        for user_id in &due {
            if let Some(sub) = store.get(*user_id) {
                self.deliver(sub.chat_id, sub.lat, sub.lon, sub.utc_offset_hours)
                    .await;
            }
        }
        for sub in store.iter_mut().filter(|s| due.contains(&s.user_id)) {
            sub.refresh_next_due(now);
        }
        due.len()
    }

    async fn deliver(&self, chat_id: i64, lat: f64, lon: f64, utc_offset_hours: i32) {
        let series = match self.weather.get_forecast(lat, lon).await {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "Forecast fetch failed; slot skipped");
                return;
            }
        };
        let text = render_forecast(&series, utc_offset_hours);
        if let Err(e) = self.transport.send_text(chat_id, &text, false).await {
            tracing::warn!(chat_id, error = %e, "Forecast delivery failed");
        } else {
            tracing::info!(chat_id, "Forecast delivered");
        }
    }
}

/// Ids of all subscribers whose slot has been reached. Linear scan; a
/// due-time-ordered heap could slot in behind the same signature.
pub fn collect_due(store: &SubscriberStore, now: i64) -> Vec<i64> {
    store
        .iter()
        .filter(|s| s.is_due(now))
        .map(|s| s.user_id)
        .collect()
}
