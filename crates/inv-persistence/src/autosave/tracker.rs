//! Unsaved-change tracking.

use std::time::Instant;

use super::AutoSaveConfig;

/// Counts session mutations that are not yet on disk.
///
/// A save in flight takes a snapshot of the count; mutations made while it
/// runs stay pending after it completes.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    pending: u32,
    in_flight: Option<u32>,
    last_change: Option<Instant>,
    /// Oldest pending change.
    oldest_pending: Option<Instant>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.pending > 0
    }

    #[inline]
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Mutations since the last successful save.
    pub fn pending_changes(&self) -> u32 {
        self.pending
    }

    pub fn mark_dirty(&mut self) {
        let now = Instant::now();
        self.pending = self.pending.saturating_add(1);
        self.last_change = Some(now);
        self.oldest_pending.get_or_insert(now);
    }

    pub fn start_save(&mut self) {
        self.in_flight = Some(self.pending);
    }

    pub fn save_complete(&mut self) {
        let saved = self.in_flight.take().unwrap_or(self.pending);
        self.pending -= saved.min(self.pending);
        if self.pending == 0 {
            self.oldest_pending = None;
        } else {
            self.oldest_pending = self.last_change;
        }
    }

    /// Everything stays pending.
    pub fn save_failed(&mut self) {
        self.in_flight = None;
    }

    pub fn ms_since_last_change(&self) -> Option<u64> {
        self.last_change.map(elapsed_ms)
    }

    pub fn ms_since_oldest_pending(&self) -> Option<u64> {
        self.oldest_pending.map(elapsed_ms)
    }

    pub fn should_auto_save(&self, config: &AutoSaveConfig) -> bool {
        if !self.is_dirty() || self.is_saving() {
            return false;
        }
        match (self.ms_since_last_change(), self.ms_since_oldest_pending()) {
            (Some(quiet_for), Some(pending_for)) => config.should_save(quiet_for, pending_for),
            _ => false,
        }
    }
}

fn elapsed_ms(at: Instant) -> u64 {
    u64::try_from(at.elapsed().as_millis()).unwrap_or(u64::MAX)
}
