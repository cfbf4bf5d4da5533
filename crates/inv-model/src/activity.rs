//! Bounded activity log.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Number of entries kept by default.
pub const ACTIVITY_LOG_CAPACITY: usize = 500;

/// Ring buffer of human-readable activity entries, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: VecDeque<String>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `"[timestamp] action: details"` and trim to `capacity`.
    pub fn record(&mut self, action: &str, details: &str, capacity: usize) {
        self.record_at(Local::now(), action, details, capacity);
    }

    pub fn record_at(
        &mut self,
        at: DateTime<Local>,
        action: &str,
        details: &str,
        capacity: usize,
    ) {
        let stamp = at.format("%d/%m/%Y, %H:%M:%S");
        self.entries
            .push_back(format!("[{stamp}] {action}: {details}"));
        self.truncate(capacity);
    }

    /// Drop the oldest entries beyond `capacity`.
    pub fn truncate(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_most_recent_entries() {
        let mut log = ActivityLog::new();
        for i in 0..(ACTIVITY_LOG_CAPACITY + 20) {
            log.record("Bien ubicado", &format!("Clave: {i}"), ACTIVITY_LOG_CAPACITY);
        }
        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
        assert!(log.iter().next().unwrap().ends_with("Clave: 20"));
        assert!(log.last().unwrap().ends_with("Clave: 519"));
    }

    #[test]
    fn test_entry_format() {
        let mut log = ActivityLog::new();
        log.record("Carga de archivo", "Área 7: 3 bienes cargados.", 10);
        let entry = log.last().unwrap();
        assert!(entry.starts_with('['));
        assert!(entry.contains("] Carga de archivo: Área 7"));
    }
}
