//! # Event Bus
//!
//! Broadcast-based publish-subscribe hub carrying Hermes-style bus messages
//! inside the process. The MQTT transport itself lives outside this crate; a
//! bridge republishes between the broker and this bus in both directions, so
//! the engine only ever sees `(topic, payload)` pairs.
//!
//! The implementation uses Tokio's broadcast channel rather than MPSC so that
//! multiple subscribers (engine, transport bridge, tests) can observe the same
//! traffic, and so publishing never blocks on a slow consumer.

use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::topic;

/// A single bus message: a topic string and a structured JSON payload.
///
/// Delivery for one subscription is in-order; no ordering is assumed across
/// distinct topics.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub topic: String,
    pub payload: Value,
}

impl Event {
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }

    /// Builds the `hermes/dialogueManager/endSession` event that speaks
    /// `text` and closes the dialogue session `session_id`.
    pub fn end_session(text: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            topic: topic::DM_END_SESSION.to_string(),
            payload: json!({
                "text": text.into(),
                "sessionId": session_id.into(),
            }),
        }
    }
}

/// Central message hub. Maintains a single broadcast channel; an internal
/// receiver keeps the channel alive while no subscriber is attached, so a
/// publish before the first `subscribe()` does not error.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    capacity: usize,
    _internal_receiver: broadcast::Receiver<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = broadcast::channel(capacity);
        Self {
            sender,
            capacity,
            _internal_receiver: receiver,
        }
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe())
    }

    /// Publishes an event to all subscribers. Fire-and-forget from the
    /// caller's perspective; an error only means the channel is closed.
    pub async fn publish(&self, event: Event) -> EventResult<()> {
        debug_event("Publishing", &event);
        self.sender
            .send(event)
            .map_err(|e| EventError::SendFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Same as [`publish`](Self::publish) but usable from a synchronous
    /// context.
    pub fn sync_publish(&self, event: Event) -> EventResult<()> {
        debug_event("Sync Publishing", &event);
        self.sender
            .send(event)
            .map_err(|e| EventError::SendFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }

    pub fn queue_size(&self) -> usize {
        self.sender.len()
    }

    pub fn subscribers_size(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn debug_event(prefix: &str, event: &Event) {
    // ASR captures are chatty on a live site; keep them at trace.
    if event.topic == topic::ASR_TEXT_CAPTURED {
        trace!("{} Event: {:?}", prefix, event);
    } else {
        debug!("{} Event: {:?}", prefix, event);
    }
}

pub struct EventReceiver {
    receiver: broadcast::Receiver<Event>,
}

impl EventReceiver {
    fn new(receiver: broadcast::Receiver<Event>) -> Self {
        Self { receiver }
    }

    /// Receives the next event. On lag the receiver resubscribes and returns
    /// the error so the caller can log how many events were skipped; call
    /// `recv` again right away to keep up.
    pub async fn recv(&mut self) -> EventResult<Event> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                self.receiver = self.receiver.resubscribe();
                Err(EventError::Lagged { count: n })
            }
            Err(e) => Err(EventError::ReceiveFailed {
                message: e.to_string(),
            }),
        }
    }
}

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Event send failed: {message}")]
    SendFailed { message: String },

    #[error("Event receive failed: {message}")]
    ReceiveFailed { message: String },

    #[error("Event receiver lagged, skipped {count} events")]
    Lagged { count: u64 },
}

pub type EventResult<T> = Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_initial_publish_success() {
        let bus = EventBus::new(16);
        let event = Event::new("hermes/tts/say", json!({"siteId": "kitchen"}));
        assert!(bus.publish(event).await.is_ok());
    }

    #[tokio::test]
    async fn test_basic_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let event = Event::new("hermes/tts/say", json!({"text": "hello"}));
        bus.publish(event.clone()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = Event::new("hermes/asr/textCaptured", json!({"text": "hi"}));
        bus.publish(event.clone()).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap(), event);
        assert_eq!(rx2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_sync_publish_from_sync_context() {
        let bus = EventBus::new(16);
        assert_eq!(bus.capacity(), 16);
        let mut rx = bus.subscribe();

        let event = Event::new("hermes/tts/say", json!({"text": "hi"}));
        bus.sync_publish(event.clone()).unwrap();
        // The internal receiver never consumes, so the event stays queued.
        assert_eq!(bus.queue_size(), 1);

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn test_end_session_payload() {
        let event = Event::end_session("done", "session-1");
        assert_eq!(event.topic, "hermes/dialogueManager/endSession");
        assert_eq!(event.payload["text"], "done");
        assert_eq!(event.payload["sessionId"], "session-1");
    }
}
