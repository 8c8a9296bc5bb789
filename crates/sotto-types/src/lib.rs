//! # sotto-types
//!
//! Shared domain types used across the Sotto workspace.
//!
//! These structures carry no behavior beyond construction and inspection:
//! command vocabulary, parsed key identities, validation verdicts, and
//! contact trust records. All of them serialize with serde so they can
//! cross the intake and UI boundaries as JSON.

pub mod command;
pub mod contact;
pub mod identity;
pub mod message;

/// Length of a rendered v4 key fingerprint in hex characters.
pub const FINGERPRINT_HEX_LEN: usize = 40;

/// Length of a rendered key id (low 64 bits of the fingerprint) in hex characters.
pub const KEY_ID_HEX_LEN: usize = 16;
