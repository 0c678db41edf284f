//! # Encore: a repeat/replay skill for a voice-assistant bus
//!
//! Encore sits on the assistant's message bus and remembers, per site, three
//! things: the last text the assistant spoke, the last two transcripts the
//! recognizer captured, and the last intent the user triggered. Three trigger
//! intents replay that memory:
//!
//! - **Say it again** repeats the last spoken output.
//! - **What did I say** reports the transcript of the previous turn with its
//!   recognition likelihood (the trigger utterance itself is also captured,
//!   which is why the store keeps a two-slot window and reports the older
//!   slot).
//! - **Repeat last action** republishes the last recorded intent under the
//!   current dialogue session, so the downstream handler runs again.
//!
//! ## Architecture
//!
//! - [`event_bus`]: broadcast-based in-process bus carrying `(topic, JSON)`
//!   messages; the MQTT transport is an external bridge.
//! - [`catalog`]: locale-keyed response sentences and intent topic names.
//! - [`store`]: per-site memory behind a narrow, infallible contract.
//! - [`engine`]: topic dispatch, observation handlers, replay composition.
//! - [`skill`]: assembly and the receive/dispatch loop.
//!
//! All state is in-memory and scoped to the process lifetime; nothing is
//! persisted.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod event_bus;
pub mod skill;
pub mod store;
pub mod topic;

// Re-exports
pub use catalog::{IntentTopics, Locale, ResponseCatalog, ResponseKind};
pub use config::EncoreConfig;
pub use engine::{EchoEngine, EngineError};
pub use error::{Error, Result};
pub use event_bus::{Event, EventBus, EventError, EventReceiver};
pub use skill::Skill;
pub use store::{Capture, SiteStateStore};

#[cfg(test)]
mod tests {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }
}
