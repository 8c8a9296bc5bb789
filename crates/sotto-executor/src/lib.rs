//! # sotto-executor
//!
//! The command-dispatch protocol: a closed registry of named command
//! kinds with declared argument schemas, a generic schema-checked
//! [`Command`], and a stateless [`Dispatcher`] that routes inbound
//! `(name, arguments)` units to per-kind [`Receiver`]s.
//!
//! The executor owns no application state and performs no I/O. It is
//! safe to call concurrently; serializing work that shares mutable
//! state is each receiver's responsibility.

pub mod command;
pub mod dispatch;
pub mod registry;

pub use command::{Command, CommandArgs, Receiver, ReceiverError};
pub use dispatch::Dispatcher;
pub use registry::{CommandRegistry, CommandRegistryBuilder, CommandSpec};

use sotto_types::command::CommandName;

/// Error types for command construction and dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The inbound name is not part of the command vocabulary, or the
    /// kind was never registered. Protocol/version mismatch; the unit
    /// is rejected, the dispatch loop continues.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    /// The argument keys do not exactly match the kind's schema.
    #[error("invalid arguments for {name}: missing {missing:?}, unexpected {unexpected:?}")]
    InvalidArguments {
        name: CommandName,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// The receiver failed. Opaque to this layer; propagated unchanged
    /// to the caller of `dispatch`.
    #[error(transparent)]
    Receiver(#[from] ReceiverError),
}
