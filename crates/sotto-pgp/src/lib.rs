//! # sotto-pgp
//!
//! Parsing and trust validation of offered public-key blocks.
//!
//! This crate implements:
//!
//! - [`armor`] - ASCII armor decoding with CRC-24 checksum verification
//! - [`packet`] - the minimal OpenPGP packet grammar needed to extract an
//!   identity record (fingerprint, user id, algorithm, creation, expiry)
//! - [`validator`] - the verdict-producing validator that sits in front of
//!   the user's accept/reject decision
//! - [`testkeys`] - well-known fixture keys shared by tests across the
//!   workspace
//!
//! ## Scope
//!
//! Only the structural subset of the key-material format is implemented
//! here: enough to decode an untrusted block into displayable identity
//! attributes. Signature verification and keyring storage belong to an
//! external cryptographic engine behind the [`KeyEngine`] trait; this
//! crate never verifies a signature.

pub mod armor;
pub mod packet;
pub mod testkeys;
pub mod validator;

use sotto_types::identity::IdentityRecord;

/// Error types for key-block parsing.
///
/// These never escape the validator: every variant is folded into a
/// [`sotto_types::identity::ValidationVerdict`] before reaching a caller
/// that handles attacker-controlled input.
#[derive(Debug, thiserror::Error)]
pub enum KeyParseError {
    /// The input carries no armored public-key block.
    #[error("input is not an armored public key block")]
    NotArmored,

    /// The armor body is not valid base64.
    #[error("invalid base64 in armor: {0}")]
    InvalidBase64(String),

    /// The armor CRC-24 checksum does not match the decoded body.
    #[error("armor checksum mismatch")]
    ChecksumMismatch,

    /// The binary key material ends mid-field.
    #[error("key material truncated")]
    Truncated,

    /// A packet header or body violates the packet grammar.
    #[error("packet grammar violation: {0}")]
    PacketGrammar(&'static str),

    /// The primary key packet uses a version we cannot fingerprint.
    #[error("unsupported key packet version {0}")]
    UnsupportedKeyVersion(u8),

    /// The block contains no public-key packet.
    #[error("no public key packet in block")]
    MissingPublicKey,
}

/// Convenience result type for key parsing.
pub type Result<T> = std::result::Result<T, KeyParseError>;

/// The consumed cryptographic-engine capability: decode an untrusted
/// public-key block into identity fields.
///
/// The session is generic over this seam so validation can be exercised
/// against stub engines; [`ArmoredKeyEngine`] is the in-tree structural
/// implementation.
pub trait KeyEngine: Send + Sync {
    /// Parse a raw block into an identity record.
    ///
    /// Pure and deterministic: byte-identical input yields an identical
    /// record. No network or disk access.
    fn parse_public_key(&self, block: &[u8]) -> Result<IdentityRecord>;
}

/// Structural key engine over ASCII-armored OpenPGP key blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArmoredKeyEngine;

impl KeyEngine for ArmoredKeyEngine {
    fn parse_public_key(&self, block: &[u8]) -> Result<IdentityRecord> {
        let material = armor::dearmor(block)?;
        packet::parse_identity(&material)
    }
}
