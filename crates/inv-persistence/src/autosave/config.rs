//! Autosave configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// When the autosave loop should write a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    pub enabled: bool,

    /// How often the autosave loop wakes up.
    pub interval_ms: u64,

    /// Quiet period after the last change before saving.
    pub debounce_ms: u64,

    /// Upper bound on how long a change may stay unsaved while edits keep
    /// arriving.
    pub max_delay_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 30_000,
            debounce_ms: 2_000,
            max_delay_ms: 30_000,
        }
    }
}

impl AutoSaveConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    /// `quiet_for_ms`: age of the newest pending change.
    /// `pending_for_ms`: age of the oldest one.
    pub fn should_save(&self, quiet_for_ms: u64, pending_for_ms: u64) -> bool {
        self.enabled && (quiet_for_ms >= self.debounce_ms || pending_for_ms >= self.max_delay_ms)
    }
}
