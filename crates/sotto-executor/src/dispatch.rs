//! Routing inbound `(name, arguments)` units to receivers.

use std::sync::Arc;

use tracing::debug;

use sotto_types::command::CommandName;

use crate::{Command, CommandArgs, CommandRegistry, ExecutorError, Receiver};

/// Stateless router over a frozen [`CommandRegistry`].
///
/// Safe to share and call concurrently from multiple inbound channels
/// (network listener, UI); the only state it touches is the read-only
/// registry. Units are routed strictly in the order the caller delivers
/// them; nothing here reorders or batches.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Route one unit: resolve the kind, schema-check the arguments,
    /// execute against the given receiver.
    ///
    /// Failure of one unit (unknown name, schema mismatch, receiver
    /// error) is reported to the caller and must not stop it from
    /// dispatching subsequent units.
    pub fn dispatch(
        &self,
        name: &str,
        args: CommandArgs,
        receiver: &dyn Receiver,
    ) -> Result<serde_json::Value, ExecutorError> {
        let kind = CommandName::from_wire(name)
            .ok_or_else(|| ExecutorError::UnknownCommand(name.to_string()))?;
        let spec = self.registry.lookup(kind)?;
        let command = Command::new(spec, args)?;
        debug!(command = %kind, "dispatching");
        command.execute(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReceiverError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingReceiver {
        calls: AtomicUsize,
    }

    impl Receiver for CountingReceiver {
        fn execute(&self, _args: &CommandArgs) -> Result<serde_json::Value, ReceiverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!(null))
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(CommandRegistry::standard()))
    }

    #[test]
    fn test_dispatch_routes_to_receiver() {
        let receiver = CountingReceiver::default();
        let mut args = CommandArgs::new();
        args.insert("address".to_string(), json!("peer.onion"));
        dispatcher()
            .dispatch("Accept Contact", args, &receiver)
            .expect("dispatch");
        assert_eq!(receiver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_name_never_invokes_receiver() {
        let receiver = CountingReceiver::default();
        let err = dispatcher()
            .dispatch("not-a-real-name", CommandArgs::new(), &receiver)
            .expect_err("unknown command");
        assert!(matches!(err, ExecutorError::UnknownCommand(_)));
        assert_eq!(receiver.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schema_mismatch_never_invokes_receiver() {
        let receiver = CountingReceiver::default();
        let err = dispatcher()
            .dispatch("Accept Contact", CommandArgs::new(), &receiver)
            .expect_err("bad schema");
        assert!(matches!(err, ExecutorError::InvalidArguments { .. }));
        assert_eq!(receiver.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_one_bad_unit_does_not_poison_the_next() {
        let receiver = CountingReceiver::default();
        let d = dispatcher();
        let _ = d.dispatch("garbage", CommandArgs::new(), &receiver);
        let mut args = CommandArgs::new();
        args.insert("address".to_string(), json!("peer.onion"));
        d.dispatch("Reject Contact", args, &receiver)
            .expect("dispatch after failure");
        assert_eq!(receiver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_vocabulary_member_missing_from_registry() {
        let registry = CommandRegistry::builder()
            .register(CommandName::SendMessage, &["address", "body"])
            .build();
        let d = Dispatcher::new(Arc::new(registry));
        let receiver = CountingReceiver::default();
        let mut args = CommandArgs::new();
        args.insert("address".to_string(), json!("peer.onion"));
        let err = d
            .dispatch("Accept Contact", args, &receiver)
            .expect_err("unregistered kind");
        assert!(matches!(err, ExecutorError::UnknownCommand(_)));
        assert_eq!(receiver.calls.load(Ordering::SeqCst), 0);
    }
}
