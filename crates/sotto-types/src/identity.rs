//! Parsed key identities and validation verdicts.

use serde::{Deserialize, Serialize};

use crate::KEY_ID_HEX_LEN;

/// Public-key algorithm of an offered key, per the OpenPGP registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAlgorithm {
    Rsa,
    RsaEncryptOnly,
    RsaSignOnly,
    Elgamal,
    Dsa,
    Ecdh,
    Ecdsa,
    EdDsa,
    /// An algorithm id we do not recognize. Carried verbatim so the UI
    /// can still show it.
    Unknown(u8),
}

impl KeyAlgorithm {
    /// Map an OpenPGP public-key algorithm id.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => KeyAlgorithm::Rsa,
            2 => KeyAlgorithm::RsaEncryptOnly,
            3 => KeyAlgorithm::RsaSignOnly,
            16 => KeyAlgorithm::Elgamal,
            17 => KeyAlgorithm::Dsa,
            18 => KeyAlgorithm::Ecdh,
            19 => KeyAlgorithm::Ecdsa,
            22 => KeyAlgorithm::EdDsa,
            other => KeyAlgorithm::Unknown(other),
        }
    }

    /// Whether we accept this algorithm for a contact's primary key.
    ///
    /// A primary key must be able to certify, so encrypt-only and
    /// unknown algorithms are refused.
    pub fn is_acceptable(&self) -> bool {
        matches!(
            self,
            KeyAlgorithm::Rsa
                | KeyAlgorithm::RsaSignOnly
                | KeyAlgorithm::Dsa
                | KeyAlgorithm::Ecdsa
                | KeyAlgorithm::EdDsa
        )
    }
}

/// Identity attributes parsed from an offered public-key block.
///
/// Produced only for blocks that parse successfully; deterministic for
/// byte-identical input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Uppercase hex v4 fingerprint (40 chars).
    pub fingerprint: String,
    /// Primary user id, verbatim from the key material. Empty when the
    /// block carries none.
    pub user_id: String,
    /// Primary key algorithm.
    pub algorithm: KeyAlgorithm,
    /// Key creation time (Unix seconds).
    pub created_at: u64,
    /// Key expiry (Unix seconds), if the key declares one.
    pub expires_at: Option<u64>,
}

impl IdentityRecord {
    /// The short key id: the low 64 bits of the fingerprint.
    pub fn key_id(&self) -> &str {
        let start = self.fingerprint.len().saturating_sub(KEY_ID_HEX_LEN);
        &self.fingerprint[start..]
    }
}

/// Why a key failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictFailure {
    /// The block could not be decoded into an identity record at all.
    Malformed,
    /// The key material uses a packet version we do not support.
    UnsupportedVersion,
    /// The primary key algorithm is not acceptable for certification.
    UnsupportedAlgorithm,
    /// The block carries no user id to show the user.
    MissingUserId,
    /// The key claims a creation time in the future.
    NotYetValid,
    /// The key's declared expiry has passed.
    Expired,
}

/// Outcome of validating an offered public-key block.
///
/// Built fresh per validation call and never mutated. When a parsed key
/// fails an acceptability check, the identity is still carried so the UI
/// can show the user what they are distrusting and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub identity: Option<IdentityRecord>,
    pub failure: Option<VerdictFailure>,
}

impl ValidationVerdict {
    /// A passing verdict for a parsed, acceptable key.
    pub fn valid(identity: IdentityRecord) -> Self {
        Self {
            is_valid: true,
            identity: Some(identity),
            failure: None,
        }
    }

    /// A failing verdict for a key that parsed but was not acceptable.
    pub fn invalid(identity: IdentityRecord, failure: VerdictFailure) -> Self {
        Self {
            is_valid: false,
            identity: Some(identity),
            failure: Some(failure),
        }
    }

    /// A failing verdict for a block that did not parse.
    pub fn unparsed(failure: VerdictFailure) -> Self {
        Self {
            is_valid: false,
            identity: None,
            failure: Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> IdentityRecord {
        IdentityRecord {
            fingerprint: "989241C552F4FD50C3475DBB55A45A99FE45E540".to_string(),
            user_id: "mactower <mactower@email.com>".to_string(),
            algorithm: KeyAlgorithm::Rsa,
            created_at: 1_494_604_550,
            expires_at: Some(1_522_555_200),
        }
    }

    #[test]
    fn test_key_id_is_low_64_bits() {
        assert_eq!(record().key_id(), "55A45A99FE45E540");
    }

    #[test]
    fn test_algorithm_acceptability() {
        assert!(KeyAlgorithm::Rsa.is_acceptable());
        assert!(KeyAlgorithm::EdDsa.is_acceptable());
        assert!(!KeyAlgorithm::RsaEncryptOnly.is_acceptable());
        assert!(!KeyAlgorithm::Elgamal.is_acceptable());
        assert!(!KeyAlgorithm::Unknown(42).is_acceptable());
    }

    #[test]
    fn test_algorithm_id_mapping() {
        assert_eq!(KeyAlgorithm::from_id(1), KeyAlgorithm::Rsa);
        assert_eq!(KeyAlgorithm::from_id(17), KeyAlgorithm::Dsa);
        assert_eq!(KeyAlgorithm::from_id(22), KeyAlgorithm::EdDsa);
        assert_eq!(KeyAlgorithm::from_id(99), KeyAlgorithm::Unknown(99));
    }

    #[test]
    fn test_verdict_constructors() {
        let v = ValidationVerdict::valid(record());
        assert!(v.is_valid && v.failure.is_none() && v.identity.is_some());

        let v = ValidationVerdict::invalid(record(), VerdictFailure::Expired);
        assert!(!v.is_valid);
        assert!(v.identity.is_some(), "identity surfaced even when invalid");
        assert_eq!(v.failure, Some(VerdictFailure::Expired));

        let v = ValidationVerdict::unparsed(VerdictFailure::Malformed);
        assert!(!v.is_valid && v.identity.is_none());
    }
}
