//! Outbound event filtering and time-batched delivery.

use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use super::state::{EventTag, PlayerEvent};
use super::PLAYER_LOG_TARGET;

/// Fixed flush window for batched event delivery. Batching keeps event storms
/// from overwhelming the host.
pub const EVENT_BATCH_WINDOW: Duration = Duration::from_secs(1);

/// Classifies, filters, and batches events before broadcast delivery.
pub struct EventAggregator {
    filter: Option<Vec<EventTag>>,
    buffer: Vec<PlayerEvent>,
    events_tx: broadcast::Sender<Vec<PlayerEvent>>,
}

impl EventAggregator {
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity);
        EventAggregator {
            filter: None,
            buffer: Vec::new(),
            events_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<PlayerEvent>> {
        self.events_tx.subscribe()
    }

    /// Installs the active settings' filter set.
    pub fn set_filter(&mut self, filter: Option<Vec<EventTag>>) {
        trace!(target: PLAYER_LOG_TARGET, ?filter, "Event filter updated.");
        self.filter = filter;
    }

    /// Kind-only delivery rule: no filter set delivers nothing, an empty set
    /// delivers everything, otherwise the tag must be listed.
    pub fn accepts(&self, tag: EventTag) -> bool {
        match &self.filter {
            None => false,
            Some(tags) if tags.is_empty() => true,
            Some(tags) => tags.contains(&tag),
        }
    }

    /// Buffers an event for the next flush, or drops it when filtered.
    pub fn push(&mut self, event: PlayerEvent) {
        if !self.accepts(event.tag()) {
            trace!(target: PLAYER_LOG_TARGET, tag = ?event.tag(), "Event filtered out.");
            return;
        }
        self.buffer.push(event);
    }

    /// Delivers the buffered batch in arrival order.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.buffer);
        trace!(target: PLAYER_LOG_TARGET, count = batch.len(), "Flushing event batch.");
        if self.events_tx.send(batch).is_err() {
            // Normal when nothing is listening yet.
            debug!(target: PLAYER_LOG_TARGET, "No active listeners for event batch.");
        }
    }

    /// Number of events waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
