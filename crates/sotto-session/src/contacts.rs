//! The in-memory contact store and trust state machine.
//!
//! State lifecycle per contact:
//!
//! ```text
//! Offered -> Validating -> { Accepted, Rejected }
//! Offered / Validating -> Expired   (timeout collaborator)
//! ```
//!
//! Terminal states admit no transitions. Every verdict is bound to a
//! BLAKE3 digest of the key block it was computed over; an accept whose
//! stored digest no longer matches the entry's current block is refused
//! so a stale verdict can never be applied to a replaced key.

use std::collections::HashMap;

use sotto_types::contact::TrustState;
use sotto_types::identity::ValidationVerdict;

use crate::SessionError;

/// Digest binding a verdict to the exact key block it covered.
pub fn block_digest(block: &[u8]) -> [u8; 32] {
    *blake3::hash(block).as_bytes()
}

/// One contact trust relationship, keyed by peer address.
#[derive(Clone, Debug)]
pub struct ContactEntry {
    pub address: String,
    pub state: TrustState,
    /// The offered key block, verbatim. Replaced on re-offer.
    pub key_block: Vec<u8>,
    /// Last validation verdict, once recorded.
    pub verdict: Option<ValidationVerdict>,
    /// Digest of the block the verdict was computed over.
    pub verdict_digest: Option<[u8; 32]>,
    /// When the offer arrived (Unix seconds).
    pub offered_at: u64,
    /// When a terminal state was reached.
    pub decided_at: Option<u64>,
}

/// In-memory contact store. Callers serialize access behind one lock;
/// methods that read a verdict and write a state do so in one call so
/// the decision is atomic under that lock.
#[derive(Debug, Default)]
pub struct ContactStore {
    entries: HashMap<String, ContactEntry>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an offered key block for an address.
    ///
    /// A fresh address creates an `Offered` entry. A pending entry
    /// (`Offered`/`Validating`) is reset to `Offered` with the new
    /// block — the old verdict is dropped, forcing re-validation. A
    /// `Rejected` or `Expired` contact may be offered anew; an
    /// `Accepted` contact may not.
    pub fn offer(
        &mut self,
        address: &str,
        key_block: &[u8],
        now: u64,
    ) -> Result<(), SessionError> {
        if let Some(entry) = self.entries.get(address) {
            if entry.state == TrustState::Accepted {
                return Err(SessionError::InvalidTransition {
                    address: address.to_string(),
                    from: entry.state,
                    action: "offer",
                });
            }
        }
        self.entries.insert(
            address.to_string(),
            ContactEntry {
                address: address.to_string(),
                state: TrustState::Offered,
                key_block: key_block.to_vec(),
                verdict: None,
                verdict_digest: None,
                offered_at: now,
                decided_at: None,
            },
        );
        Ok(())
    }

    /// Attach a validation verdict: `Offered -> Validating`.
    ///
    /// The digest must be of the block the verdict was computed over;
    /// if the entry's block has changed since, the verdict is refused
    /// as stale.
    pub fn record_verdict(
        &mut self,
        address: &str,
        verdict: ValidationVerdict,
        digest: [u8; 32],
    ) -> Result<(), SessionError> {
        let entry = self.entry_mut(address)?;
        if entry.state != TrustState::Offered {
            return Err(SessionError::InvalidTransition {
                address: address.to_string(),
                from: entry.state,
                action: "record_verdict",
            });
        }
        if block_digest(&entry.key_block) != digest {
            return Err(SessionError::StaleVerdict {
                address: address.to_string(),
            });
        }
        entry.verdict = Some(verdict);
        entry.verdict_digest = Some(digest);
        entry.state = TrustState::Validating;
        Ok(())
    }

    /// Apply the user's accept: `Validating -> Accepted`.
    ///
    /// Requires both a valid verdict and a digest still matching the
    /// entry's current key block. An accept after an invalid verdict is
    /// an error, never a silent transition.
    pub fn accept(&mut self, address: &str, now: u64) -> Result<&ContactEntry, SessionError> {
        let entry = self.entry_mut(address)?;
        if entry.state != TrustState::Validating {
            return Err(SessionError::InvalidTransition {
                address: address.to_string(),
                from: entry.state,
                action: "accept",
            });
        }
        let verdict = entry
            .verdict
            .as_ref()
            .ok_or_else(|| SessionError::UntrustedKey {
                address: address.to_string(),
                failure: None,
            })?;
        if !verdict.is_valid {
            return Err(SessionError::UntrustedKey {
                address: address.to_string(),
                failure: verdict.failure,
            });
        }
        if entry.verdict_digest != Some(block_digest(&entry.key_block)) {
            return Err(SessionError::StaleVerdict {
                address: address.to_string(),
            });
        }
        entry.state = TrustState::Accepted;
        entry.decided_at = Some(now);
        Ok(entry)
    }

    /// Apply the user's reject: `Validating -> Rejected`.
    pub fn reject(&mut self, address: &str, now: u64) -> Result<&ContactEntry, SessionError> {
        let entry = self.entry_mut(address)?;
        if entry.state != TrustState::Validating {
            return Err(SessionError::InvalidTransition {
                address: address.to_string(),
                from: entry.state,
                action: "reject",
            });
        }
        entry.state = TrustState::Rejected;
        entry.decided_at = Some(now);
        Ok(entry)
    }

    /// Timeout signal: `Offered`/`Validating` -> `Expired`.
    pub fn expire(&mut self, address: &str, now: u64) -> Result<(), SessionError> {
        let entry = self.entry_mut(address)?;
        if entry.state.is_terminal() {
            return Err(SessionError::InvalidTransition {
                address: address.to_string(),
                from: entry.state,
                action: "expire",
            });
        }
        entry.state = TrustState::Expired;
        entry.decided_at = Some(now);
        Ok(())
    }

    /// Expire every pending offer made at or before `cutoff`. Returns
    /// the addresses that expired.
    pub fn sweep_expired(&mut self, cutoff: u64, now: u64) -> Vec<String> {
        let mut expired = Vec::new();
        for entry in self.entries.values_mut() {
            if !entry.state.is_terminal() && entry.offered_at <= cutoff {
                entry.state = TrustState::Expired;
                entry.decided_at = Some(now);
                expired.push(entry.address.clone());
            }
        }
        expired.sort();
        expired
    }

    pub fn get(&self, address: &str) -> Option<&ContactEntry> {
        self.entries.get(address)
    }

    pub fn state(&self, address: &str) -> Option<TrustState> {
        self.entries.get(address).map(|e| e.state)
    }

    pub fn is_accepted(&self, address: &str) -> bool {
        self.state(address) == Some(TrustState::Accepted)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, address: &str) -> Result<&mut ContactEntry, SessionError> {
        self.entries
            .get_mut(address)
            .ok_or_else(|| SessionError::UnknownContact(address.to_string()))
    }
}
