//! Dispatcher — the single control loop tying everything together.
//!
//! One tick: drain a batch of updates, route each to command handling or to
//! the chat's live dialogue, run a scheduling pass, sleep. Strictly
//! sequential; nothing else mutates the store or the dialogue table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::dialogue::{Dialogue, SubscribeDialogue};
use crate::scheduler::AlertScheduler;
use crate::store::SubscriberStore;
use crate::telegram::types::{Message, ReplyKeyboardRemove, ReplyMarkup, SendMessage, Update};
use crate::telegram::{parse_command, Transport, UpdateConsumer};
use crate::weather::{render_forecast, ForecastProvider};

const FALLBACK_REPLY: &str =
    "I did not understand that. Send /start to subscribe to the daily forecast.";

pub struct Dispatcher {
    bot_name: String,
    transport: Arc<dyn Transport>,
    weather: Arc<dyn ForecastProvider>,
    consumer: UpdateConsumer,
    scheduler: AlertScheduler,
    store: SubscriberStore,
    /// Live dialogues, keyed by chat id. At most one per chat.
    dialogues: HashMap<i64, Dialogue>,
    tick_interval: Duration,
}

impl Dispatcher {
    pub fn new(
        bot_name: impl Into<String>,
        transport: Arc<dyn Transport>,
        weather: Arc<dyn ForecastProvider>,
        store: SubscriberStore,
        poll_timeout_secs: u32,
        tick_interval: Duration,
    ) -> Self {
        Self {
            bot_name: bot_name.into(),
            consumer: UpdateConsumer::new(transport.clone(), poll_timeout_secs),
            scheduler: AlertScheduler::new(weather.clone(), transport.clone()),
            transport,
            weather,
            store,
            dialogues: HashMap::new(),
            tick_interval,
        }
    }

    /// Drive ticks until ctrl-c, then flush the store and return.
    pub async fn run(&mut self) -> crate::error::Result<()> {
        tracing::info!(subscribers = self.store.len(), "Dispatcher loop started");
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
                _ = self.tick() => {}
            }
            tokio::time::sleep(self.tick_interval).await;
        }
        self.store.save()?;
        tracing::info!("Subscriber store flushed; goodbye");
        Ok(())
    }

    /// One loop iteration at the current wall-clock time.
    pub async fn tick(&mut self) {
        self.tick_at(Utc::now().timestamp()).await;
    }

    /// One loop iteration against the provided timestamp.
    pub async fn tick_at(&mut self, now: i64) {
        match self.consumer.fetch_batch().await {
            Ok(batch) => {
                for update in batch {
                    self.handle_update(update, now).await;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Update fetch failed; retrying next tick"),
        }
        self.scheduler.tick(&mut self.store, now).await;
    }

    async fn handle_update(&mut self, update: Update, now: i64) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text.clone() else {
            return;
        };
        tracing::debug!(update_id = update.update_id, chat_id = message.chat.id, "Update received");

        if let Some(cmd) = parse_command(&text, &self.bot_name) {
            // A command always wins over a dialogue in flight; a half-built
            // subscription does not survive it.
            let cmd = cmd.to_string();
            self.dialogues.remove(&message.chat.id);
            self.handle_command(&cmd, &message, now).await;
        } else if let Some(dialogue) = self.dialogues.get_mut(&message.chat.id) {
            let step = dialogue.on_message(&text, now);
            let ended = dialogue.is_ended();
            if ended {
                self.dialogues.remove(&message.chat.id);
            }
            if let Some(sub) = step.finalized {
                let user_id = sub.user_id;
                match self.store.insert(sub) {
                    Ok(()) => tracing::info!(user_id, "Subscription stored"),
                    Err(e) => tracing::error!(user_id, error = %e, "Failed to persist subscription"),
                }
            }
            if let Some(reply) = step.reply {
                self.send_text(message.chat.id, &reply).await;
            }
        } else {
            self.send_text(message.chat.id, FALLBACK_REPLY).await;
        }
    }

    async fn handle_command(&mut self, cmd: &str, message: &Message, now: i64) {
        let chat_id = message.chat.id;
        let user_id = message.from.as_ref().map(|u| u.id).unwrap_or(chat_id);

        match cmd {
            "/start" => {
                let mut dialogue = Dialogue::Subscribe(SubscribeDialogue::new(user_id, chat_id));
                if let Some(prompt) = dialogue.on_start() {
                    // The prompt also detaches any custom keyboard a previous
                    // session may have left on screen.
                    let msg = SendMessage::new(chat_id, prompt)
                        .with_reply_markup(ReplyMarkup::Remove(ReplyKeyboardRemove::new()));
                    self.send_structured(msg).await;
                }
                self.dialogues.insert(chat_id, dialogue);
                tracing::info!(user_id, chat_id, "Subscription dialogue started");
            }
            "/stop" => {
                let removed = match self.store.remove(user_id) {
                    Ok(removed) => removed,
                    Err(e) => {
                        tracing::error!(user_id, error = %e, "Failed to persist unsubscribe");
                        None
                    }
                };
                let reply = if removed.is_some() {
                    tracing::info!(user_id, "Unsubscribed");
                    "You are unsubscribed. Send /start to subscribe again."
                } else {
                    "You are not subscribed."
                };
                self.send_text(chat_id, reply).await;
            }
            "/forecast" => match self.store.get(user_id) {
                Some(sub) => {
                    let (lat, lon, offset) = (sub.lat, sub.lon, sub.utc_offset_hours);
                    match self.weather.get_forecast(lat, lon).await {
                        Ok(series) => {
                            let text = render_forecast(&series, offset);
                            self.send_text(chat_id, &text).await;
                        }
                        Err(e) => {
                            tracing::warn!(user_id, error = %e, "On-demand forecast failed");
                            self.send_text(chat_id, "Could not fetch the forecast right now. Please try again later.")
                                .await;
                        }
                    }
                }
                None => {
                    self.send_text(chat_id, "You are not subscribed. Send /start to subscribe.")
                        .await;
                }
            },
            "/info" => {
                let reply = match self.store.get(user_id) {
                    Some(sub) => {
                        let wait = sub.seconds_until_due(now);
                        format!(
                            "Your subscription:\n\
                             Coordinates: {} {}\n\
                             UTC offset: {:+} h\n\
                             Daily alert at {:02}:{:02} local time\n\
                             Next forecast in {} h {} min.",
                            sub.lat,
                            sub.lon,
                            sub.utc_offset_hours,
                            sub.alert_hour,
                            sub.alert_minute,
                            wait / 3600,
                            (wait % 3600) / 60,
                        )
                    }
                    None => "You are not subscribed. Send /start to subscribe.".to_string(),
                };
                self.send_text(chat_id, &reply).await;
            }
            other => {
                tracing::debug!(command = other, "Unrecognized command");
                self.send_text(chat_id, FALLBACK_REPLY).await;
            }
        }
    }

    async fn send_text(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text, false).await {
            tracing::warn!(chat_id, error = %e, "Reply send failed");
        }
    }

    async fn send_structured(&self, msg: SendMessage) {
        let chat_id = msg.chat_id;
        if let Err(e) = self.transport.send_structured(&msg).await {
            tracing::warn!(chat_id, error = %e, "Reply send failed");
        }
    }

    pub fn store(&self) -> &SubscriberStore {
        &self.store
    }

    pub fn live_dialogue_count(&self) -> usize {
        self.dialogues.len()
    }
}
