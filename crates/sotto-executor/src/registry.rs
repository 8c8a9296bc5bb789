//! The CommandSpec registry: command kinds and their argument schemas.
//!
//! Populated once at startup through the builder and read-only after
//! `build()`. There is deliberately no way to register a kind at
//! runtime: the vocabulary is a build-time extension point.

use std::collections::HashMap;

use sotto_types::command::CommandName;

use crate::ExecutorError;

/// A command kind: its name and the exact argument keys it accepts.
#[derive(Clone, Debug)]
pub struct CommandSpec {
    name: CommandName,
    valid_keys: &'static [&'static str],
}

impl CommandSpec {
    pub fn name(&self) -> CommandName {
        self.name
    }

    /// The exact set of argument keys a command of this kind must carry.
    pub fn valid_keys(&self) -> &'static [&'static str] {
        self.valid_keys
    }
}

/// Immutable mapping from command name to schema.
#[derive(Debug)]
pub struct CommandRegistry {
    specs: HashMap<CommandName, CommandSpec>,
}

impl CommandRegistry {
    pub fn builder() -> CommandRegistryBuilder {
        CommandRegistryBuilder {
            specs: HashMap::new(),
        }
    }

    /// The full standard vocabulary of this protocol version.
    pub fn standard() -> Self {
        Self::builder()
            .register(CommandName::NewContactRequest, &["payload"])
            .register(CommandName::NewContactResponse, &["payload"])
            .register(CommandName::SendMessage, &["address", "body"])
            .register(CommandName::ReceiveMessage, &["payload"])
            .register(CommandName::AcceptContact, &["address"])
            .register(CommandName::RejectContact, &["address"])
            .build()
    }

    /// Look up the schema for a command kind.
    pub fn lookup(&self, name: CommandName) -> Result<&CommandSpec, ExecutorError> {
        self.specs
            .get(&name)
            .ok_or_else(|| ExecutorError::UnknownCommand(name.as_wire().to_string()))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Builder consumed by `build()`; the only way to populate a registry.
#[derive(Debug)]
pub struct CommandRegistryBuilder {
    specs: HashMap<CommandName, CommandSpec>,
}

impl CommandRegistryBuilder {
    /// Register a command kind with its argument schema. Registering
    /// the same kind twice replaces the earlier schema.
    pub fn register(mut self, name: CommandName, valid_keys: &'static [&'static str]) -> Self {
        self.specs.insert(name, CommandSpec { name, valid_keys });
        self
    }

    pub fn build(self) -> CommandRegistry {
        CommandRegistry { specs: self.specs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sotto_types::command::ALL_COMMANDS;

    #[test]
    fn test_standard_registry_covers_vocabulary() {
        let registry = CommandRegistry::standard();
        assert_eq!(registry.len(), ALL_COMMANDS.len());
        for name in ALL_COMMANDS {
            let spec = registry.lookup(name).expect("registered");
            assert_eq!(spec.name(), name);
            assert!(!spec.valid_keys().is_empty());
        }
    }

    #[test]
    fn test_lookup_unregistered_kind() {
        let registry = CommandRegistry::builder()
            .register(CommandName::SendMessage, &["address", "body"])
            .build();
        let err = registry.lookup(CommandName::AcceptContact);
        assert!(matches!(err, Err(ExecutorError::UnknownCommand(_))));
    }

    #[test]
    fn test_reregistration_replaces_schema() {
        let registry = CommandRegistry::builder()
            .register(CommandName::SendMessage, &["payload"])
            .register(CommandName::SendMessage, &["address", "body"])
            .build();
        let spec = registry.lookup(CommandName::SendMessage).expect("spec");
        assert_eq!(spec.valid_keys(), &["address", "body"]);
    }
}
