//! Skill assembly: wires the event bus, catalog, store and engine together
//! and runs the receive/dispatch loop.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{info, warn};

use crate::catalog::ResponseCatalog;
use crate::config::EncoreConfig;
use crate::engine::EchoEngine;
use crate::error::Result;
use crate::event_bus::{Event, EventBus, EventError};
use crate::store::SiteStateStore;

/// Internal wake-up topic published by `shutdown` so the dispatch loop does
/// not stay blocked in `recv` waiting for one more bus event. The engine
/// ignores it like any other unknown topic.
const SHUTDOWN_TOPIC: &str = "encore/skill/shutdown";

/// The running skill. A transport bridge (MQTT or otherwise) attaches to
/// [`event_bus`](Self::event_bus) and republishes in both directions; the
/// skill itself only ever talks to the in-process bus.
pub struct Skill {
    engine: Arc<EchoEngine>,
    bus: Arc<EventBus>,
    running: Arc<AtomicBool>,
}

impl Skill {
    pub fn new(config: &EncoreConfig) -> Self {
        let bus = Arc::new(EventBus::new(config.event_buffer_size));
        let catalog = ResponseCatalog::new(config.locale);
        let intents = config
            .intents
            .clone()
            .unwrap_or_else(|| catalog.intent_topics().clone());
        let engine = Arc::new(EchoEngine::new(
            Arc::new(SiteStateStore::new()),
            catalog,
            intents,
            bus.clone(),
        ));
        Self {
            engine,
            bus,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    pub fn engine(&self) -> Arc<EchoEngine> {
        self.engine.clone()
    }

    /// Spawns the dispatch loop. A malformed event or a lagging receiver is
    /// logged and skipped; neither stops the loop.
    pub fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);

        let bus = self.bus.clone();
        let engine = self.engine.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            let mut receiver = bus.subscribe();
            while running.load(Ordering::SeqCst) {
                match receiver.recv().await {
                    Ok(event) => {
                        if let Err(e) = engine.handle(&event).await {
                            warn!("Dropping event: {}", e);
                        }
                    }
                    Err(EventError::Lagged { count }) => {
                        warn!("Receiver lagged, skipped {} events", count);
                    }
                    Err(e) => {
                        warn!("Event bus closed: {}", e);
                        break;
                    }
                }
            }
        });

        info!("Skill started");
        Ok(())
    }

    /// Stops the dispatch loop. Clearing the running flag alone would leave
    /// the task parked in `recv` until the next event arrived; the wake-up
    /// event makes the exit immediate.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self
            .bus
            .sync_publish(Event::new(SHUTDOWN_TOPIC, serde_json::Value::Null));
        info!("Skill stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Locale;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_intent_override_wins() {
        let config = EncoreConfig {
            locale: Locale::En,
            intents: Some(crate::catalog::IntentTopics {
                say_it_again: "hermes/intent/mine:Again".to_string(),
                what_did_i_say: "hermes/intent/mine:What".to_string(),
                repeat_action: "hermes/intent/mine:Repeat".to_string(),
            }),
            ..Default::default()
        };
        let skill = Skill::new(&config);
        // The engine subscribes lazily; only the internal receiver exists.
        assert_eq!(skill.event_bus().subscribers_size(), 1);
    }
}
