//! Subscription dialogue — collects coordinates, UTC offset, and alert time.

use crate::dialogue::StepResult;
use crate::subscriber::Subscriber;

/// Which field the dialogue is waiting for.
///
/// Progresses linearly: WaitPosition → WaitTimeZone → WaitAlertTime → Ended.
/// A failed parse re-prompts the current step without advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitPosition,
    WaitTimeZone,
    WaitAlertTime,
    Ended,
}

/// The onboarding flow for one chat. Candidate values live only here until
/// the final step builds the Subscriber; nothing is persisted mid-dialogue.
#[derive(Debug)]
pub struct SubscribeDialogue {
    user_id: i64,
    chat_id: i64,
    state: State,
    lat: f64,
    lon: f64,
    utc_offset_hours: i32,
}

impl SubscribeDialogue {
    pub fn new(user_id: i64, chat_id: i64) -> Self {
        Self {
            user_id,
            chat_id,
            state: State::WaitPosition,
            lat: 0.0,
            lon: 0.0,
            utc_offset_hours: 0,
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn is_ended(&self) -> bool {
        self.state == State::Ended
    }

    /// Entry prompt, emitted once when the dialogue is created.
    pub fn on_start(&mut self) -> Option<String> {
        self.state = State::WaitPosition;
        Some(
            "What are your coordinates?\n\
             Please provide your latitude and longitude.\n\
             For example: 45.67 32.312"
                .to_string(),
        )
    }

    /// Feed one user reply into the state machine.
    pub fn on_message(&mut self, text: &str, now: i64) -> StepResult {
        match self.state {
            State::WaitPosition => match parse_position(text) {
                Some((lat, lon)) => {
                    self.lat = lat;
                    self.lon = lon;
                    self.state = State::WaitTimeZone;
                    StepResult::reply(format!(
                        "Your coordinates are: {lat} {lon}\n\
                         Now send your UTC offset in whole hours.\n\
                         For example: 3 or -5"
                    ))
                }
                None => StepResult::reply(
                    "Your coordinates have wrong format. Please try again.".to_string(),
                ),
            },
            State::WaitTimeZone => match parse_utc_offset(text) {
                Some(offset) => {
                    self.utc_offset_hours = offset;
                    self.state = State::WaitAlertTime;
                    StepResult::reply(
                        "Please provide the time at which you want to receive the forecast \
                         in format HH:MM.\n\
                         For example: 9:30"
                            .to_string(),
                    )
                }
                None => StepResult::reply(
                    "The UTC offset must be a whole number of hours between -12 and 12. \
                     Please try again."
                        .to_string(),
                ),
            },
            State::WaitAlertTime => match parse_alert_time(text) {
                Some((hour, minute)) => {
                    let sub = Subscriber::new(
                        self.user_id,
                        self.chat_id,
                        self.lat,
                        self.lon,
                        hour,
                        minute,
                        self.utc_offset_hours,
                        now,
                    );
                    let wait = sub.seconds_until_due(now);
                    self.state = State::Ended;
                    StepResult {
                        reply: Some(format!(
                            "You are subscribed to the daily forecast.\n\
                             The first one arrives in {} h {} min.",
                            wait / 3600,
                            (wait % 3600) / 60
                        )),
                        finalized: Some(sub),
                    }
                }
                None => StepResult::reply(
                    "The alert time has wrong format. Please try again.".to_string(),
                ),
            },
            State::Ended => StepResult::silent(),
        }
    }
}

/// Two float tokens: latitude in (-90, 90], longitude in [-180, 180).
/// Extra trailing tokens are ignored.
fn parse_position(text: &str) -> Option<(f64, f64)> {
    let mut tokens = text.split_whitespace();
    let lat: f64 = tokens.next()?.parse().ok()?;
    let lon: f64 = tokens.next()?.parse().ok()?;
    if lat <= -90.0 || lat > 90.0 || !lat.is_finite() {
        return None;
    }
    if lon < -180.0 || lon >= 180.0 || !lon.is_finite() {
        return None;
    }
    Some((lat, lon))
}

/// One integer token in [-12, 12].
fn parse_utc_offset(text: &str) -> Option<i32> {
    let mut tokens = text.split_whitespace();
    let offset: i32 = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() || !(-12..=12).contains(&offset) {
        return None;
    }
    Some(offset)
}

/// `HH:MM`, colon or space separated; hour < 24, minute < 60.
fn parse_alert_time(text: &str) -> Option<(u32, u32)> {
    let mut tokens = text
        .trim()
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|t| !t.is_empty());
    let hour: u32 = tokens.next()?.parse().ok()?;
    let minute: u32 = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() || hour >= 24 || minute >= 60 {
        return None;
    }
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_615_766_400; // 2021-03-15 00:00:00 UTC

    #[test]
    fn parse_position_accepts_valid_pairs() {
        assert_eq!(parse_position("45.67 32.312"), Some((45.67, 32.312)));
        assert_eq!(parse_position("90 -180"), Some((90.0, -180.0)));
        assert_eq!(parse_position("  -12.5   100.0  "), Some((-12.5, 100.0)));
    }

    #[test]
    fn parse_position_rejects_out_of_range() {
        assert_eq!(parse_position("-90 0"), None); // lat is open at -90
        assert_eq!(parse_position("90.001 0"), None);
        assert_eq!(parse_position("0 180"), None); // lon is open at 180
        assert_eq!(parse_position("200 32"), None);
        assert_eq!(parse_position("0 -180.5"), None);
    }

    #[test]
    fn parse_position_rejects_garbage() {
        assert_eq!(parse_position("abc"), None);
        assert_eq!(parse_position("45.67"), None);
        assert_eq!(parse_position("abc def"), None);
        assert_eq!(parse_position(""), None);
        assert_eq!(parse_position("nan nan"), None);
    }

    #[test]
    fn parse_utc_offset_bounds() {
        assert_eq!(parse_utc_offset("3"), Some(3));
        assert_eq!(parse_utc_offset("-12"), Some(-12));
        assert_eq!(parse_utc_offset("12"), Some(12));
        assert_eq!(parse_utc_offset("13"), None);
        assert_eq!(parse_utc_offset("-13"), None);
        assert_eq!(parse_utc_offset("3.5"), None);
        assert_eq!(parse_utc_offset("three"), None);
        assert_eq!(parse_utc_offset("3 4"), None);
    }

    #[test]
    fn parse_alert_time_formats() {
        assert_eq!(parse_alert_time("9:30"), Some((9, 30)));
        assert_eq!(parse_alert_time("09:05"), Some((9, 5)));
        assert_eq!(parse_alert_time("9 30"), Some((9, 30)));
        assert_eq!(parse_alert_time("0:00"), Some((0, 0)));
        assert_eq!(parse_alert_time("23:59"), Some((23, 59)));
    }

    #[test]
    fn parse_alert_time_rejects_invalid() {
        assert_eq!(parse_alert_time("24:00"), None);
        assert_eq!(parse_alert_time("9:60"), None);
        assert_eq!(parse_alert_time("99:99"), None);
        assert_eq!(parse_alert_time("930"), None);
        assert_eq!(parse_alert_time("abc"), None);
        assert_eq!(parse_alert_time("9:30:00"), None);
    }

    #[test]
    fn happy_path_finalizes_subscriber() {
        let mut d = SubscribeDialogue::new(1, 1);
        assert!(d.on_start().is_some());

        let r = d.on_message("45.67 32.312", NOW);
        assert!(r.finalized.is_none());
        assert!(r.reply.unwrap().contains("45.67 32.312"));

        let r = d.on_message("3", NOW);
        assert!(r.finalized.is_none());
        assert!(r.reply.is_some());

        let r = d.on_message("9:30", NOW);
        let sub = r.finalized.expect("subscriber should be finalized");
        assert_eq!(sub.user_id, 1);
        assert_eq!(sub.chat_id, 1);
        assert_eq!(sub.lat, 45.67);
        assert_eq!(sub.lon, 32.312);
        assert_eq!(sub.utc_offset_hours, 3);
        assert_eq!(sub.alert_hour, 9);
        assert_eq!(sub.alert_minute, 30);
        assert!(sub.next_due > NOW);
        assert!(d.is_ended());
    }

    #[test]
    fn confirmation_reports_time_until_first_alert() {
        // NOW is midnight UTC; local 09:30 at UTC+3 is 06:30 UTC, 6.5h away.
        let mut d = SubscribeDialogue::new(1, 1);
        d.on_start();
        d.on_message("45.67 32.312", NOW);
        d.on_message("3", NOW);
        let r = d.on_message("9:30", NOW);
        assert!(r.reply.unwrap().contains("6 h 30 min"));
    }

    #[test]
    fn malformed_input_reprompts_without_advancing() {
        let mut d = SubscribeDialogue::new(1, 1);
        d.on_start();

        for bad in ["abc", "200 32", "45.67"] {
            let r = d.on_message(bad, NOW);
            assert!(r.reply.unwrap().contains("try again"));
            assert!(r.finalized.is_none());
            assert!(!d.is_ended());
            assert_eq!(d.state, State::WaitPosition);
        }

        d.on_message("45.67 32.312", NOW);
        let r = d.on_message("99", NOW);
        assert!(r.reply.is_some());
        assert_eq!(d.state, State::WaitTimeZone);

        d.on_message("3", NOW);
        let r = d.on_message("99:99", NOW);
        assert!(r.reply.unwrap().contains("try again"));
        assert_eq!(d.state, State::WaitAlertTime);
        assert!(!d.is_ended());
    }

    #[test]
    fn ended_dialogue_stays_silent() {
        let mut d = SubscribeDialogue::new(1, 1);
        d.on_start();
        d.on_message("45.67 32.312", NOW);
        d.on_message("3", NOW);
        d.on_message("9:30", NOW);
        assert!(d.is_ended());

        let r = d.on_message("anything", NOW);
        assert!(r.reply.is_none());
        assert!(r.finalized.is_none());
    }
}
