//! Schema-checked commands and the receiver capability.

use std::collections::BTreeMap;

use sotto_types::command::CommandName;

use crate::{CommandSpec, ExecutorError};

/// Arguments carried by a command: key to JSON value.
pub type CommandArgs = BTreeMap<String, serde_json::Value>;

/// A failure inside a receiver's `execute`.
///
/// The executor treats the cause as opaque: it neither inspects nor
/// translates it, it only carries it back to the caller of `dispatch`.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct ReceiverError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl ReceiverError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// The capability a command delegates to: one implementation per
/// command kind, owned by the application layer.
///
/// Receivers typically own mutable shared state (contact list, message
/// log) and must serialize concurrent `execute` calls behind one lock
/// per receiver instance. Blocking inside `execute` must not be able to
/// stall routing of unrelated commands to other receivers.
pub trait Receiver: Send + Sync {
    fn execute(&self, args: &CommandArgs) -> Result<serde_json::Value, ReceiverError>;
}

/// One validated instance of a command kind.
///
/// Construction is the schema check: a `Command` existing means its
/// arguments exactly matched the kind's declared keys. Execution
/// consumes the command, so a constructed command runs at most once;
/// idempotence beyond that is the receiver's concern.
#[derive(Debug)]
pub struct Command<'r> {
    spec: &'r CommandSpec,
    args: CommandArgs,
}

impl<'r> Command<'r> {
    /// Construct a command, rejecting any argument-key mismatch.
    ///
    /// The schema is strict in both directions: missing keys and
    /// unexpected keys are each an error, so protocol drift on either
    /// side is caught at the boundary instead of inside a receiver.
    pub fn new(spec: &'r CommandSpec, args: CommandArgs) -> Result<Self, ExecutorError> {
        let missing: Vec<String> = spec
            .valid_keys()
            .iter()
            .filter(|key| !args.contains_key(**key))
            .map(|key| (*key).to_string())
            .collect();
        let unexpected: Vec<String> = args
            .keys()
            .filter(|key| !spec.valid_keys().contains(&key.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(ExecutorError::InvalidArguments {
                name: spec.name(),
                missing,
                unexpected,
            });
        }

        Ok(Self { spec, args })
    }

    pub fn name(&self) -> CommandName {
        self.spec.name()
    }

    /// Read-only view of the validated arguments.
    pub fn args(&self) -> &CommandArgs {
        &self.args
    }

    /// Delegate to the receiver, propagating its result unchanged.
    pub fn execute(self, receiver: &dyn Receiver) -> Result<serde_json::Value, ExecutorError> {
        receiver.execute(&self.args).map_err(ExecutorError::from)
    }
}
