//! Contact trust records and the trust lifecycle vocabulary.

use serde::{Deserialize, Serialize};

use crate::identity::IdentityRecord;

/// Lifecycle state of a contact trust relationship.
///
/// `Accepted`, `Rejected` and `Expired` are terminal: no transition
/// leaves them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustState {
    /// A key block was offered; validation has not run yet.
    Offered,
    /// A verdict is on record; awaiting the user's decision.
    Validating,
    /// Valid key and explicit user accept.
    Accepted,
    /// Invalid verdict or explicit user reject.
    Rejected,
    /// The offer timed out before a decision was made.
    Expired,
}

impl TrustState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TrustState::Accepted | TrustState::Rejected | TrustState::Expired
        )
    }
}

/// A contact request as carried on the wire: the peer's reachable
/// address paired with their offered (untrusted) armored key block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactRequest {
    /// Peer network address (e.g. an onion address).
    pub address: String,
    /// ASCII-armored public-key block, untrusted until validated.
    pub key_block: String,
    /// Optional nonce correlating request and response.
    pub request_id: Option<String>,
}

/// A contact response: the answering peer's own address and key block,
/// sent back for the original requester to validate in turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub address: String,
    pub key_block: String,
    pub request_id: Option<String>,
}

/// What the session surfaces to the UI for one contact trust decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactOfferView {
    pub address: String,
    /// Parsed identity, present whenever the block parsed — even for
    /// invalid keys, so the user can see why the key is untrusted.
    pub identity: Option<IdentityRecord>,
    pub is_valid: bool,
    pub failure: Option<crate::identity::VerdictFailure>,
}
