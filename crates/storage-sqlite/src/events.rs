//! Broadcast-based change notification.
//!
//! Repositories publish a [`StoreEvent`] after every committed mutation;
//! the sync engine publishes after pulls. Events carry no row data:
//! subscribers re-read live state, so a lagged receiver loses nothing it
//! cannot recover by re-reading.

use log::debug;
use tokio::sync::broadcast;
use vigil_core::sync::StoreEvent;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<StoreEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. No subscribers is not an error.
    pub fn publish(&self, event: StoreEvent) {
        if self.sender.send(event).is_err() {
            debug!("[Store] Change event dropped: no subscribers");
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
