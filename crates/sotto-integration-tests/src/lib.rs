//! Integration test crate for the Sotto session.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end trust and messaging flows across multiple
//! workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p sotto-integration-tests
//! ```
