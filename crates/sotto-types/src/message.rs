//! Message payloads exchanged with accepted contacts.

use serde::{Deserialize, Serialize};

/// An inbound message unit as delivered by the transport collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Sender's network address.
    pub address: String,
    /// Message body, verbatim.
    pub body: String,
}

/// A message queued or recorded by the session, stamped on receipt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedMessage {
    pub address: String,
    pub body: String,
    /// Unix seconds at which the session recorded the message.
    pub recorded_at: u64,
}
