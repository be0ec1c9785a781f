//! Update consumption — advances a monotonic cursor over the update queue.

use std::sync::Arc;

use crate::error::TransportError;
use crate::telegram::api::Transport;
use crate::telegram::types::Update;

/// Fetches batches of pending updates and tracks the next offset to request.
///
/// The cursor starts unconstrained (fetch from the beginning of the retained
/// window) and advances to `max(update_id) + 1` after each successful
/// non-empty fetch — the only place it moves. A failed fetch leaves it
/// untouched, so the same batch is redelivered next tick: at-least-once,
/// never skipped.
pub struct UpdateConsumer {
    transport: Arc<dyn Transport>,
    offset: Option<i64>,
    timeout_secs: u32,
}

impl UpdateConsumer {
    pub fn new(transport: Arc<dyn Transport>, timeout_secs: u32) -> Self {
        Self {
            transport,
            offset: None,
            timeout_secs,
        }
    }

    /// Fetch the next batch, in arrival order, and advance the cursor past it.
    pub async fn fetch_batch(&mut self) -> Result<Vec<Update>, TransportError> {
        let batch = self
            .transport
            .fetch_batch(self.offset, self.timeout_secs)
            .await?;
        if let Some(max_id) = batch.iter().map(|u| u.update_id).max() {
            self.offset = Some(max_id + 1);
        }
        Ok(batch)
    }

    /// The offset the next fetch will request, if constrained yet.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::telegram::types::SendMessage;

    /// Scripted transport: pops one pre-canned result per fetch and records
    /// the offset each fetch requested.
    struct ScriptedTransport {
        batches: Mutex<Vec<Result<Vec<Update>, TransportError>>>,
        requested_offsets: Mutex<Vec<Option<i64>>>,
    }

    impl ScriptedTransport {
        fn new(batches: Vec<Result<Vec<Update>, TransportError>>) -> Self {
            Self {
                batches: Mutex::new(batches),
                requested_offsets: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn fetch_batch(
            &self,
            offset: Option<i64>,
            _timeout_secs: u32,
        ) -> Result<Vec<Update>, TransportError> {
            self.requested_offsets.lock().unwrap().push(offset);
            let mut batches = self.batches.lock().unwrap();
            if batches.is_empty() {
                Ok(Vec::new())
            } else {
                batches.remove(0)
            }
        }

        async fn send_text(
            &self,
            _chat_id: i64,
            _text: &str,
            _link_preview: bool,
        ) -> Result<(), TransportError> {
            Ok(())
        }

        async fn send_structured(&self, _msg: &SendMessage) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn update(id: i64) -> Update {
        serde_json::from_value(serde_json::json!({ "update_id": id })).unwrap()
    }

    #[tokio::test]
    async fn cursor_advances_past_max_update_id() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(vec![
            update(5),
            update(6),
            update(9),
        ])]));
        let mut consumer = UpdateConsumer::new(transport.clone(), 2);

        assert_eq!(consumer.offset(), None);
        let batch = consumer.fetch_batch().await.unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(consumer.offset(), Some(10));

        // The follow-up fetch must request exactly offset 10.
        consumer.fetch_batch().await.unwrap();
        assert_eq!(
            transport.requested_offsets.lock().unwrap().as_slice(),
            &[None, Some(10)]
        );
    }

    #[tokio::test]
    async fn empty_batch_leaves_cursor_unchanged() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(vec![update(3)]),
            Ok(vec![]),
        ]));
        let mut consumer = UpdateConsumer::new(transport, 2);

        consumer.fetch_batch().await.unwrap();
        assert_eq!(consumer.offset(), Some(4));
        consumer.fetch_batch().await.unwrap();
        assert_eq!(consumer.offset(), Some(4));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cursor_unchanged() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(vec![update(7)]),
            Err(TransportError::RequestFailed {
                method: "getUpdates".into(),
                reason: "connection reset".into(),
            }),
        ]));
        let mut consumer = UpdateConsumer::new(transport, 2);

        consumer.fetch_batch().await.unwrap();
        assert_eq!(consumer.offset(), Some(8));
        assert!(consumer.fetch_batch().await.is_err());
        assert_eq!(consumer.offset(), Some(8));
    }
}
