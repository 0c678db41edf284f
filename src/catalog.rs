//! # Response Catalog
//!
//! Locale-keyed table of response sentences and intent topic names. The
//! catalog is built once at startup from the configured locale; no runtime
//! lookup of locale modules happens after that.
//!
//! Intent topic names are per-locale because each assistant bundle registers
//! its trigger intents under its own namespace on the bus.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Assistant locales the skill ships sentences for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
    De,
    It,
}

/// Semantic kinds of fallback responses the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ResponseKind {
    /// No spoken output was ever observed for this site.
    NoSpokenMemory,
    /// Fewer than two transcripts are on record for this site.
    NoTranscriptMemory,
    /// A transcript is on record but it is empty (silence was captured).
    HeardNothing,
    /// No replayable intent was ever observed for this site.
    NoIntentMemory,
}

/// Bus topic names of the three trigger intents for one locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IntentTopics {
    pub say_it_again: String,
    pub what_did_i_say: String,
    pub repeat_action: String,
}

impl IntentTopics {
    fn new(say_it_again: &str, what_did_i_say: &str, repeat_action: &str) -> Self {
        Self {
            say_it_again: say_it_again.to_string(),
            what_did_i_say: what_did_i_say.to_string(),
            repeat_action: repeat_action.to_string(),
        }
    }
}

/// Locale-bound lookup for response sentences and intent topics.
pub struct ResponseCatalog {
    locale: Locale,
    intents: IntentTopics,
}

impl ResponseCatalog {
    pub fn new(locale: Locale) -> Self {
        let intents = match locale {
            Locale::En => IntentTopics::new(
                "hermes/intent/koan:SayItAgain",
                "hermes/intent/koan:WhatDidISay",
                "hermes/intent/koan:RepeatAction",
            ),
            Locale::Fr => IntentTopics::new(
                "hermes/intent/Tealque:SayItAgain",
                "hermes/intent/Tealque:WhatDidISay",
                "hermes/intent/Tealque:RepeatAction",
            ),
            // The German bundle never shipped a RepeatAction intent; the
            // English topic stands in so the trigger is still reachable.
            Locale::De => IntentTopics::new(
                "hermes/intent/Philipp:SayItAgain",
                "hermes/intent/Philipp:WhatDidISay",
                "hermes/intent/koan:RepeatAction",
            ),
            Locale::It => IntentTopics::new(
                "hermes/intent/boggiano:Ripetilo",
                "hermes/intent/boggiano:CosaHoDetto",
                "hermes/intent/boggiano:RipetiAzione",
            ),
        };
        Self { locale, intents }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn intent_topics(&self) -> &IntentTopics {
        &self.intents
    }

    /// The locale's fallback sentence for `kind`.
    pub fn message(&self, kind: ResponseKind) -> &'static str {
        use Locale::*;
        use ResponseKind::*;
        match (self.locale, kind) {
            (En, NoSpokenMemory) => {
                "Sorry, I don't remember what I said. I must have fallen asleep."
            }
            (En, NoTranscriptMemory) => {
                "Sorry, I don't remember what you said. I must have fallen asleep."
            }
            (En, HeardNothing) => "Sorry, I didn't hear anything.",
            (En, NoIntentMemory) => "Sorry, I don't know what I should repeat.",

            (Fr, NoSpokenMemory) => {
                "Désolé, je ne me souviens pas de ce que j'ai dit. Je dois m'être endormi."
            }
            (Fr, NoTranscriptMemory) => {
                "Désolé, je ne me souviens pas de ce que vous avez dit. Je dois m'être endormi."
            }
            (Fr, HeardNothing) => "Désolé, je n'ai rien entendu.",
            (Fr, NoIntentMemory) => {
                "Désolé, je ne me souviens pas de la dernière action. Je dois m'être endormi"
            }

            (De, NoSpokenMemory) => {
                "Entschuldigung, ich weis nicht was ich gesagt habe. Ich muss wohl eingeschlafen sein"
            }
            (De, NoTranscriptMemory) => {
                "Entschuldigung, ich habe vergessen was du gesagt hast."
            }
            (De, HeardNothing) => "Entschuldigung, ich habe nichts gehört.",
            // The German bundle shipped no sentence for this one.
            (De, NoIntentMemory) => "Sorry, I don't know what I should repeat.",

            (It, NoSpokenMemory) => {
                "Scusa, non mi ricordo cosa ho detto. Devo essermi addormentato."
            }
            (It, NoTranscriptMemory) => {
                "Scusa, non mi ricordo cosa hai detto. Devo essermi addormentato."
            }
            (It, HeardNothing) => "Scusa, non ho sentito nulla.",
            (It, NoIntentMemory) => {
                "Scusa, non ricordo la mia ultima azione. Devo essermi addormentato."
            }
        }
    }

    /// The templated "I heard ... with likelihood ..." sentence. Word order
    /// follows the locale (German reports the likelihood first).
    pub fn heard(&self, text: &str, confidence: f64) -> String {
        match self.locale {
            Locale::En => format!("I heard \"{}\" with likelihood {}.", text, confidence),
            Locale::Fr => format!(
                "J'ai entendu: \"{}\" avec une probabilité de {}.",
                text, confidence
            ),
            Locale::De => format!(
                "Ich habe mit einer Wahrscheinlichkeit von {} gehört: \"{}\"",
                confidence, text
            ),
            Locale::It => format!("Ho sentito \"{}\" con probabilità {}.", text, confidence),
        }
    }
}
