//! Command vocabulary for the action-dispatch protocol.
//!
//! The wire names are exchanged between peers and between the UI and the
//! session, so they are stable protocol vocabulary: renaming one breaks
//! compatibility with peers still speaking the old name.

use serde::{Deserialize, Serialize};

/// The closed set of supported command kinds.
///
/// Every command routed through the dispatcher names one of these. The
/// set is fixed at build time; there is no runtime extension point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandName {
    /// A stranger offers their identity and asks to become a contact.
    #[serde(rename = "New Contact Request")]
    NewContactRequest,
    /// A peer answers our earlier contact request with their identity.
    #[serde(rename = "New Contact Response")]
    NewContactResponse,
    /// Queue an outbound message to an accepted contact.
    #[serde(rename = "Send Message")]
    SendMessage,
    /// An inbound message arrived from a peer.
    #[serde(rename = "Receive Message")]
    ReceiveMessage,
    /// The user accepted a pending contact offer.
    #[serde(rename = "Accept Contact")]
    AcceptContact,
    /// The user rejected a pending contact offer.
    #[serde(rename = "Reject Contact")]
    RejectContact,
}

/// All command kinds, in wire-vocabulary order.
pub const ALL_COMMANDS: [CommandName; 6] = [
    CommandName::NewContactRequest,
    CommandName::NewContactResponse,
    CommandName::SendMessage,
    CommandName::ReceiveMessage,
    CommandName::AcceptContact,
    CommandName::RejectContact,
];

impl CommandName {
    /// The stable wire name for this command.
    pub fn as_wire(&self) -> &'static str {
        match self {
            CommandName::NewContactRequest => "New Contact Request",
            CommandName::NewContactResponse => "New Contact Response",
            CommandName::SendMessage => "Send Message",
            CommandName::ReceiveMessage => "Receive Message",
            CommandName::AcceptContact => "Accept Contact",
            CommandName::RejectContact => "Reject Contact",
        }
    }

    /// Resolve a wire name. Unknown names are `None`, never a variant.
    pub fn from_wire(name: &str) -> Option<Self> {
        ALL_COMMANDS.iter().copied().find(|c| c.as_wire() == name)
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}
