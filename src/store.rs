//! # Site State Store
//!
//! The per-site memory of the skill: the last spoken output, a bounded
//! two-slot window of captured transcripts, and the last replayable intent.
//! Sites are created lazily on first observation and live for the process
//! lifetime.
//!
//! All mutation goes through the narrow method contract below; absence is an
//! explicit `None`, never an error.

use dashmap::DashMap;
use serde_json::Value;

/// One captured transcript with its recognition confidence, rounded to two
/// decimal digits on the way in.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub text: String,
    pub confidence: f64,
}

/// Bounded two-slot transcript window, insertion-ordered, FIFO eviction.
///
/// The window holds two entries because asking "what did I say" itself
/// produces a capture event: the most recent slot is the question, the older
/// slot is the answer. [`prior`](Self::prior) therefore reports the older
/// slot, and only when exactly two entries are present.
///
/// This couples the window to recognizer timing: if zero or several ordinary
/// captures land between trigger utterances, the older slot may be stale. The
/// coupling is inherited platform behavior and is kept as an explicit, tested
/// contract here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureWindow {
    slots: [Option<Capture>; 2],
}

impl CaptureWindow {
    /// Appends a capture, evicting the oldest entry when both slots are full.
    pub fn push(&mut self, capture: Capture) {
        // slot 0 is the newest entry; whatever was in slot 1 falls out.
        self.slots[1] = self.slots[0].take();
        self.slots[0] = Some(capture);
    }

    /// The older of the two entries, only when exactly two are present.
    pub fn prior(&self) -> Option<&Capture> {
        match (&self.slots[0], &self.slots[1]) {
            (Some(_), Some(older)) => Some(older),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The intent event most recently observed for a site, kept verbatim so it
/// can be republished.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedIntent {
    pub topic: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Default)]
struct SiteState {
    last_spoken: Option<String>,
    captures: CaptureWindow,
    last_intent: Option<RecordedIntent>,
}

/// Concurrent map from site id to its state record.
///
/// `DashMap::entry` holds the shard write lock across the whole
/// read-modify-write, so recording for one site is atomic with respect to
/// other events for the same site; events for distinct sites proceed
/// independently.
#[derive(Default)]
pub struct SiteStateStore {
    sites: DashMap<String, SiteState>,
}

impl SiteStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_spoken(&self, site: &str, text: &str) {
        self.sites.entry(site.to_string()).or_default().last_spoken = Some(text.to_string());
    }

    pub fn record_capture(&self, site: &str, text: &str, confidence: f64) {
        let rounded = (confidence * 100.0).round() / 100.0;
        self.sites
            .entry(site.to_string())
            .or_default()
            .captures
            .push(Capture {
                text: text.to_string(),
                confidence: rounded,
            });
    }

    pub fn record_intent(&self, site: &str, topic: &str, payload: Value) {
        self.sites.entry(site.to_string()).or_default().last_intent = Some(RecordedIntent {
            topic: topic.to_string(),
            payload,
        });
    }

    pub fn spoken(&self, site: &str) -> Option<String> {
        self.sites.get(site)?.last_spoken.clone()
    }

    /// The second-most-recent capture for `site`; `None` unless exactly two
    /// captures are on record. See [`CaptureWindow::prior`].
    pub fn prior_capture(&self, site: &str) -> Option<Capture> {
        self.sites.get(site)?.captures.prior().cloned()
    }

    pub fn intent(&self, site: &str) -> Option<RecordedIntent> {
        self.sites.get(site)?.last_intent.clone()
    }

    /// Number of sites observed so far, for diagnostics.
    pub fn sites(&self) -> usize {
        self.sites.len()
    }
}
