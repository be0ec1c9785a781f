//! Subscriber entity and alert-time arithmetic.

use serde::{Deserialize, Serialize};

const DAY_SECS: i64 = 86_400;

/// A confirmed subscription: who to notify, where they are, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Telegram user id — the stable identity the store is keyed by.
    pub user_id: i64,
    /// Chat id the daily forecast is delivered to.
    pub chat_id: i64,
    /// Latitude in (-90, 90].
    pub lat: f64,
    /// Longitude in [-180, 180).
    pub lon: f64,
    /// Local wall-clock hour of the daily alert, 0..=23.
    pub alert_hour: u32,
    /// Local wall-clock minute of the daily alert, 0..=59.
    pub alert_minute: u32,
    /// Whole-hour UTC offset of the subscriber, -12..=12.
    pub utc_offset_hours: i32,
    /// Unix time of the next alert. Always strictly in the future relative
    /// to the instant it was last computed.
    pub next_due: i64,
}

impl Subscriber {
    /// Build a subscriber and compute its first due time from `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: i64,
        chat_id: i64,
        lat: f64,
        lon: f64,
        alert_hour: u32,
        alert_minute: u32,
        utc_offset_hours: i32,
        now: i64,
    ) -> Self {
        Self {
            user_id,
            chat_id,
            lat,
            lon,
            alert_hour,
            alert_minute,
            utc_offset_hours,
            next_due: next_due_after(alert_hour, alert_minute, utc_offset_hours, now),
        }
    }

    /// Whether the alert slot has been reached.
    pub fn is_due(&self, now: i64) -> bool {
        now >= self.next_due
    }

    /// Recompute `next_due` from `now`. Called after the alert fires and
    /// once at startup, since a stored due time may be stale by then.
    pub fn refresh_next_due(&mut self, now: i64) {
        self.next_due = next_due_after(
            self.alert_hour,
            self.alert_minute,
            self.utc_offset_hours,
            now,
        );
    }

    /// Seconds until the next alert.
    pub fn seconds_until_due(&self, now: i64) -> i64 {
        self.next_due - now
    }
}

/// Unix time of the next `alert_hour:alert_minute` in the subscriber's local
/// wall clock, strictly after `now`.
///
/// The candidate is built on the local calendar date implied by
/// `utc_offset_hours`, then pushed forward a day at a time while it is at or
/// before `now` — so a slot that already passed today lands on tomorrow, and
/// `now` landing exactly on the slot also advances a full day.
pub fn next_due_after(alert_hour: u32, alert_minute: u32, utc_offset_hours: i32, now: i64) -> i64 {
    let offset_secs = i64::from(utc_offset_hours) * 3600;
    let local_now = now + offset_secs;
    let local_midnight = local_now - local_now.rem_euclid(DAY_SECS);
    let local_slot = local_midnight + i64::from(alert_hour) * 3600 + i64::from(alert_minute) * 60;

    let mut candidate = local_slot - offset_secs;
    while candidate <= now {
        candidate += DAY_SECS;
    }
    candidate
}
