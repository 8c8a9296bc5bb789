//! Session event surface consumed by the UI collaborator.
//!
//! Trust decisions are asynchronous from the UI's point of view: the
//! session pushes events (an offer to decide on, a decision applied, a
//! message recorded) onto a broadcast bus and the UI re-enters decisions
//! as new command units. No UI types cross into the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// An event emitted by the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Event type name (e.g. "ContactOffered", "MessageQueued").
    pub event_type: String,
    /// Unix timestamp.
    pub timestamp: u64,
    /// Type-specific payload.
    pub payload: serde_json::Value,
}

/// Broadcast bus for pushing session events to subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a bus with the given per-subscriber buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: SessionEvent) {
        self.sequence.fetch_add(1, Ordering::SeqCst);
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Number of events emitted so far.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}
