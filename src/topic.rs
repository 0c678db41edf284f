//! Fixed Hermes bus topics the skill observes and emits.
//!
//! Intent topics are not listed here: they vary per assistant locale and are
//! supplied by the [`catalog`](crate::catalog) (or overridden in config).

/// Spoken output emitted by the TTS service.
pub const TTS_SAY: &str = "hermes/tts/say";

/// Transcript captured by the ASR service, with its likelihood.
pub const ASR_TEXT_CAPTURED: &str = "hermes/asr/textCaptured";

/// Outbound: speak a text and end the current dialogue session.
pub const DM_END_SESSION: &str = "hermes/dialogueManager/endSession";

/// Prefix shared by every recognized-intent topic (`hermes/intent/#`).
pub const INTENT_PREFIX: &str = "hermes/intent/";

/// Whether `topic` falls under the wildcard intent subscription.
pub fn is_intent(topic: &str) -> bool {
    topic.starts_with(INTENT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_intent() {
        assert!(is_intent("hermes/intent/koan:SayItAgain"));
        assert!(is_intent("hermes/intent/someone:TurnOnLights"));
        assert!(!is_intent("hermes/tts/say"));
        assert!(!is_intent("hermes/asr/textCaptured"));
    }
}
