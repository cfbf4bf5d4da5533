//! Notifications from the session to its presentation layer.

use std::sync::mpsc::{self, Receiver, Sender};

use inv_archive::ExportKind;

/// Something the presentation layer may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    DataImported {
        source_file: String,
        area: String,
        imported: usize,
        skipped: usize,
    },
    AssetAssigned {
        key: String,
        custodian: String,
    },
    AssetUnassigned {
        key: String,
    },
    /// Every asset of the area is located.
    AreaCompleted {
        area: String,
    },
    /// A completed area has pending assets again.
    AreaReopened {
        area: String,
    },
    AreaClosed {
        area: String,
    },
    /// Every asset of the inventory is located. Sent once per session.
    InventoryCompleted,
    CustodiansChanged,
    AdditionalItemsChanged,
    PhotoUpdated {
        key: String,
    },
    PackageExported {
        kind: ExportKind,
        file_name: String,
    },
    SessionRestored {
        read_only: bool,
    },
    SessionReset,
    /// Persistence failed; the session accepts no further changes.
    ReadOnlyEntered,
}

/// Fan-out of [`SessionEvent`]s to any number of receivers.
///
/// Receivers that have been dropped are pruned on the next emit.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SessionEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: SessionEvent) {
        tracing::trace!(?event, subscribers = self.subscribers.len(), "session event");
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives() {
        let mut bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.emit(SessionEvent::InventoryCompleted);
        assert_eq!(first.try_recv(), Ok(SessionEvent::InventoryCompleted));
        assert_eq!(second.try_recv(), Ok(SessionEvent::InventoryCompleted));
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let mut bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.emit(SessionEvent::SessionReset);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok(SessionEvent::SessionReset));
    }
}
