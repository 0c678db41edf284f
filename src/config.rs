//! Skill configuration, loaded once at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalog::{IntentTopics, Locale};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoreConfig {
    /// Capacity of the in-process event bus.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,

    /// Assistant locale; selects response sentences and intent topics.
    #[serde(default)]
    pub locale: Locale,

    /// Overrides the catalog's per-locale trigger topic names, for
    /// assistants whose intents live under a different namespace.
    #[serde(default)]
    pub intents: Option<IntentTopics>,
}

impl Default for EncoreConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: default_event_buffer_size(),
            locale: Locale::default(),
            intents: None,
        }
    }
}

fn default_event_buffer_size() -> usize {
    100
}

impl EncoreConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::internal(format!("Failed to read config file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::internal(format!("Failed to parse config file: {}", e)))
    }
}
