//! # Echo Engine
//!
//! Stateless dispatch over the persistent [`SiteStateStore`]: each inbound
//! bus event either updates a site's memory (observation topics) or reads it
//! and publishes a derived event (replay triggers).
//!
//! Every replay branch is total: any combination of remembered state maps to
//! a defined response, so no request ever surfaces an error to the user. A
//! malformed payload drops that single event with a warning and leaves all
//! site state untouched.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::catalog::{IntentTopics, ResponseCatalog, ResponseKind};
use crate::event_bus::{Event, EventBus, EventError};
use crate::store::SiteStateStore;
use crate::topic;

/// `hermes/tts/say` payload fields the engine cares about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SayPayload {
    site_id: String,
    text: String,
}

/// `hermes/asr/textCaptured` payload fields the engine cares about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextCapturedPayload {
    site_id: String,
    text: String,
    likelihood: f64,
}

/// Fields common to every `hermes/intent/…` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentPayload {
    site_id: String,
    session_id: String,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed payload on {topic}: {message}")]
    MalformedPayload { topic: String, message: String },

    #[error("Event error: {0}")]
    Event(#[from] EventError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Consumes bus events, updates per-site memory, and answers the three
/// replay triggers.
pub struct EchoEngine {
    store: Arc<SiteStateStore>,
    catalog: ResponseCatalog,
    intents: IntentTopics,
    bus: Arc<EventBus>,
}

impl EchoEngine {
    pub fn new(
        store: Arc<SiteStateStore>,
        catalog: ResponseCatalog,
        intents: IntentTopics,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            catalog,
            intents,
            bus,
        }
    }

    pub fn store(&self) -> &Arc<SiteStateStore> {
        &self.store
    }

    /// Dispatches one inbound event. The trigger intents are matched by
    /// exact topic; everything else under `hermes/intent/` is recorded for
    /// later replay.
    pub async fn handle(&self, event: &Event) -> EngineResult<()> {
        match event.topic.as_str() {
            topic::TTS_SAY => self.observe_spoken(event),
            topic::ASR_TEXT_CAPTURED => self.observe_capture(event),
            t if t == self.intents.say_it_again => {
                self.observe_intent(event)?;
                self.replay_spoken(event).await
            }
            t if t == self.intents.what_did_i_say => {
                self.observe_intent(event)?;
                self.replay_capture(event).await
            }
            // Never recorded as last intent: recording it would let a repeat
            // of a repeat capture itself and replay without bound.
            t if t == self.intents.repeat_action => self.replay_intent(event).await,
            t if topic::is_intent(t) => self.observe_intent(event),
            other => {
                trace!("Ignoring event on {}", other);
                Ok(())
            }
        }
    }

    fn observe_spoken(&self, event: &Event) -> EngineResult<()> {
        let payload: SayPayload = parse(event)?;
        self.store.record_spoken(&payload.site_id, &payload.text);
        Ok(())
    }

    fn observe_capture(&self, event: &Event) -> EngineResult<()> {
        let payload: TextCapturedPayload = parse(event)?;
        self.store
            .record_capture(&payload.site_id, &payload.text, payload.likelihood);
        Ok(())
    }

    fn observe_intent(&self, event: &Event) -> EngineResult<()> {
        let payload: IntentPayload = parse(event)?;
        self.store
            .record_intent(&payload.site_id, &event.topic, event.payload.clone());
        Ok(())
    }

    /// "Say it again": repeat the last spoken output for the site verbatim.
    async fn replay_spoken(&self, event: &Event) -> EngineResult<()> {
        let request: IntentPayload = parse(event)?;
        let text = match self.store.spoken(&request.site_id) {
            Some(text) => text,
            None => self
                .catalog
                .message(ResponseKind::NoSpokenMemory)
                .to_string(),
        };
        debug!("Replaying spoken output for site {}", request.site_id);
        self.bus
            .publish(Event::end_session(text, request.session_id))
            .await?;
        Ok(())
    }

    /// "What did I say": report the transcript of the turn before this
    /// question, with its likelihood.
    async fn replay_capture(&self, event: &Event) -> EngineResult<()> {
        let request: IntentPayload = parse(event)?;
        let text = match self.store.prior_capture(&request.site_id) {
            None => self
                .catalog
                .message(ResponseKind::NoTranscriptMemory)
                .to_string(),
            Some(capture) if capture.text.is_empty() => self
                .catalog
                .message(ResponseKind::HeardNothing)
                .to_string(),
            Some(capture) => self.catalog.heard(&capture.text, capture.confidence),
        };
        debug!("Replaying prior capture for site {}", request.site_id);
        self.bus
            .publish(Event::end_session(text, request.session_id))
            .await?;
        Ok(())
    }

    /// "Repeat last action": republish the last recorded intent with the
    /// session id of the current request, so the downstream dialogue
    /// continues in the live session rather than the stale one.
    async fn replay_intent(&self, event: &Event) -> EngineResult<()> {
        let request: IntentPayload = parse(event)?;
        match self.store.intent(&request.site_id) {
            Some(recorded) => {
                let mut payload = recorded.payload;
                if let Some(object) = payload.as_object_mut() {
                    object.insert(
                        "sessionId".to_string(),
                        Value::String(request.session_id.clone()),
                    );
                }
                debug!(
                    "Replaying intent {} for site {}",
                    recorded.topic, request.site_id
                );
                self.bus.publish(Event::new(recorded.topic, payload)).await?;
            }
            None => {
                self.bus
                    .publish(Event::end_session(
                        self.catalog.message(ResponseKind::NoIntentMemory),
                        request.session_id,
                    ))
                    .await?;
            }
        }
        Ok(())
    }
}

fn parse<T: DeserializeOwned>(event: &Event) -> EngineResult<T> {
    serde_json::from_value(event.payload.clone()).map_err(|e| EngineError::MalformedPayload {
        topic: event.topic.clone(),
        message: e.to_string(),
    })
}
