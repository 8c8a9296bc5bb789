//! Verdict-producing key validation.
//!
//! Sits directly in front of a user-facing trust decision, so it never
//! returns an error and never panics on attacker-controlled input: every
//! failure mode is data in the verdict.

use std::time::{SystemTime, UNIX_EPOCH};

use sotto_types::identity::{IdentityRecord, ValidationVerdict, VerdictFailure};

use crate::{ArmoredKeyEngine, KeyEngine, KeyParseError};

/// Validates offered public-key blocks against a [`KeyEngine`].
#[derive(Clone, Debug)]
pub struct KeyValidator<E = ArmoredKeyEngine> {
    engine: E,
}

impl KeyValidator<ArmoredKeyEngine> {
    /// Validator over the in-tree armored-block engine.
    pub fn new() -> Self {
        Self {
            engine: ArmoredKeyEngine,
        }
    }
}

impl Default for KeyValidator<ArmoredKeyEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: KeyEngine> KeyValidator<E> {
    /// Validator over a caller-supplied engine.
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// Validate a block against the wall clock.
    pub fn validate(&self, block: &[u8]) -> ValidationVerdict {
        self.validate_at(block, unix_now())
    }

    /// Validate a block as of a given instant (Unix seconds).
    ///
    /// Deterministic: byte-identical input and the same `now` yield an
    /// identical verdict.
    pub fn validate_at(&self, block: &[u8], now: u64) -> ValidationVerdict {
        let record = match self.engine.parse_public_key(block) {
            Ok(record) => record,
            Err(KeyParseError::UnsupportedKeyVersion(_)) => {
                return ValidationVerdict::unparsed(VerdictFailure::UnsupportedVersion);
            }
            Err(_) => return ValidationVerdict::unparsed(VerdictFailure::Malformed),
        };

        match acceptability(&record, now) {
            Some(failure) => ValidationVerdict::invalid(record, failure),
            None => ValidationVerdict::valid(record),
        }
    }
}

/// Acceptability checks over a parsed record, in order of severity.
fn acceptability(record: &IdentityRecord, now: u64) -> Option<VerdictFailure> {
    if !record.algorithm.is_acceptable() {
        return Some(VerdictFailure::UnsupportedAlgorithm);
    }
    if record.user_id.is_empty() {
        return Some(VerdictFailure::MissingUserId);
    }
    if record.created_at > now {
        return Some(VerdictFailure::NotYetValid);
    }
    if let Some(expires_at) = record.expires_at {
        if expires_at <= now {
            return Some(VerdictFailure::Expired);
        }
    }
    None
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
