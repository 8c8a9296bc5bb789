//! Messaging session: contact trust lifecycle and message recording.
//!
//! A [`Session`] owns the command vocabulary, one receiver per command
//! kind, the contact store, and the event bus. Inbound `(name, args)`
//! units — from the network listener or the UI — all go through
//! [`Session::handle_unit`], which routes them through the dispatcher
//! so every unit gets the same schema check and the same at-most-once
//! execution.

pub mod contacts;
pub mod events;
mod receivers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::info;

use sotto_executor::{CommandArgs, CommandRegistry, Dispatcher, ExecutorError, Receiver};
use sotto_pgp::validator::KeyValidator;
use sotto_types::command::CommandName;
use sotto_types::contact::{ContactOfferView, TrustState};
use sotto_types::identity::VerdictFailure;
use sotto_types::message::RecordedMessage;

use crate::contacts::ContactStore;
use crate::events::{EventBus, SessionEvent};
use crate::receivers::{
    AcceptContactReceiver, NewContactRequestReceiver, NewContactResponseReceiver,
    ReceiveMessageReceiver, RejectContactReceiver, SendMessageReceiver, TrustContext,
};

/// Per-subscriber event buffer.
const EVENT_BUS_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown contact: {0}")]
    UnknownContact(String),
    #[error("cannot {action} contact {address} from state {from:?}")]
    InvalidTransition {
        address: String,
        from: TrustState,
        action: &'static str,
    },
    #[error("key offered by {address} is not trusted ({failure:?})")]
    UntrustedKey {
        address: String,
        failure: Option<VerdictFailure>,
    },
    #[error("verdict for {address} no longer matches its key block")]
    StaleVerdict { address: String },
    #[error("contact {address} is not accepted")]
    ContactNotTrusted { address: String },
    #[error("bad payload: {0}")]
    BadPayload(String),
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// One running messaging session.
pub struct Session {
    dispatcher: Dispatcher,
    receivers: HashMap<CommandName, Arc<dyn Receiver>>,
    ctx: Arc<TrustContext>,
    outbox: Arc<Mutex<Vec<RecordedMessage>>>,
    inbox: Arc<Mutex<Vec<RecordedMessage>>>,
}

impl Session {
    pub fn new() -> Self {
        let ctx = Arc::new(TrustContext {
            contacts: Mutex::new(ContactStore::new()),
            validator: KeyValidator::new(),
            bus: EventBus::new(EVENT_BUS_CAPACITY),
        });
        let outbox: Arc<Mutex<Vec<RecordedMessage>>> = Arc::new(Mutex::new(Vec::new()));
        let inbox: Arc<Mutex<Vec<RecordedMessage>>> = Arc::new(Mutex::new(Vec::new()));

        let mut receivers: HashMap<CommandName, Arc<dyn Receiver>> = HashMap::new();
        receivers.insert(
            CommandName::NewContactRequest,
            Arc::new(NewContactRequestReceiver::new(ctx.clone())),
        );
        receivers.insert(
            CommandName::NewContactResponse,
            Arc::new(NewContactResponseReceiver::new(ctx.clone())),
        );
        receivers.insert(
            CommandName::AcceptContact,
            Arc::new(AcceptContactReceiver::new(ctx.clone())),
        );
        receivers.insert(
            CommandName::RejectContact,
            Arc::new(RejectContactReceiver::new(ctx.clone())),
        );
        receivers.insert(
            CommandName::SendMessage,
            Arc::new(SendMessageReceiver::new(ctx.clone(), outbox.clone())),
        );
        receivers.insert(
            CommandName::ReceiveMessage,
            Arc::new(ReceiveMessageReceiver::new(ctx.clone(), inbox.clone())),
        );

        Self {
            dispatcher: Dispatcher::new(Arc::new(CommandRegistry::standard())),
            receivers,
            ctx,
            outbox,
            inbox,
        }
    }

    /// Handle one inbound unit. One failing unit must not affect the
    /// handling of the next; callers log the error and keep going.
    pub fn handle_unit(&self, name: &str, args: CommandArgs) -> Result<Value, ExecutorError> {
        let kind = CommandName::from_wire(name)
            .ok_or_else(|| ExecutorError::UnknownCommand(name.to_string()))?;
        let receiver = self
            .receivers
            .get(&kind)
            .ok_or_else(|| ExecutorError::UnknownCommand(name.to_string()))?;
        self.dispatcher.dispatch(name, args, receiver.as_ref())
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.ctx.bus.subscribe()
    }

    pub fn trust_state(&self, address: &str) -> Option<TrustState> {
        self.ctx.lock_contacts().state(address)
    }

    /// The pending offer for an address, if one is awaiting a decision.
    pub fn pending_offer(&self, address: &str) -> Option<ContactOfferView> {
        let contacts = self.ctx.lock_contacts();
        let entry = contacts.get(address)?;
        if entry.state != TrustState::Validating {
            return None;
        }
        let verdict = entry.verdict.as_ref()?;
        Some(ContactOfferView {
            address: entry.address.clone(),
            identity: verdict.identity.clone(),
            is_valid: verdict.is_valid,
            failure: verdict.failure,
        })
    }

    /// Expire one pending offer (timeout collaborator).
    pub fn expire_contact(&self, address: &str) -> Result<(), SessionError> {
        self.ctx.lock_contacts().expire(address, unix_now())?;
        info!(address, "contact offer expired");
        self.emit_expired(address);
        Ok(())
    }

    /// Expire every pending offer older than `max_age_secs`. Returns
    /// the expired addresses.
    pub fn sweep_expired(&self, max_age_secs: u64) -> Vec<String> {
        let now = unix_now();
        let cutoff = now.saturating_sub(max_age_secs);
        let expired = self.ctx.lock_contacts().sweep_expired(cutoff, now);
        for address in &expired {
            info!(address, "contact offer expired");
            self.emit_expired(address);
        }
        expired
    }

    pub fn outbox_snapshot(&self) -> Vec<RecordedMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn inbox_snapshot(&self) -> Vec<RecordedMessage> {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn emit_expired(&self, address: &str) {
        self.ctx.bus.emit(SessionEvent {
            event_type: "ContactExpired".to_string(),
            timestamp: unix_now(),
            payload: serde_json::json!({ "address": address }),
        });
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sotto_pgp::testkeys;

    const ADDR: &str = "qrstuvwxyz234567.onion";

    fn offer_args(key_block: &str) -> CommandArgs {
        let mut args = CommandArgs::new();
        args.insert(
            "payload".to_string(),
            json!({ "address": ADDR, "key_block": key_block }),
        );
        args
    }

    fn address_args() -> CommandArgs {
        let mut args = CommandArgs::new();
        args.insert("address".to_string(), json!(ADDR));
        args
    }

    fn offered_session() -> Session {
        let session = Session::new();
        session
            .handle_unit(
                "New Contact Request",
                offer_args(testkeys::SOTTO_FIXTURE_PUBLIC_KEY),
            )
            .expect("offer");
        session
    }

    #[test]
    fn test_request_offer_accept_send() {
        let session = offered_session();
        assert_eq!(session.trust_state(ADDR), Some(TrustState::Validating));
        let offer = session.pending_offer(ADDR).expect("pending offer");
        assert!(offer.is_valid);
        assert_eq!(
            offer.identity.expect("identity").fingerprint,
            testkeys::SOTTO_FIXTURE_FINGERPRINT
        );

        session
            .handle_unit("Accept Contact", address_args())
            .expect("accept");
        assert_eq!(session.trust_state(ADDR), Some(TrustState::Accepted));

        let mut args = address_args();
        args.insert("body".to_string(), json!("hello"));
        session.handle_unit("Send Message", args).expect("send");
        let outbox = session.outbox_snapshot();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].body, "hello");
    }

    #[test]
    fn test_response_goes_through_same_flow() {
        let session = Session::new();
        session
            .handle_unit(
                "New Contact Response",
                offer_args(testkeys::SOTTO_FIXTURE_PUBLIC_KEY),
            )
            .expect("offer via response");
        assert_eq!(session.trust_state(ADDR), Some(TrustState::Validating));
    }

    #[test]
    fn test_reject_flow() {
        let session = offered_session();
        session
            .handle_unit("Reject Contact", address_args())
            .expect("reject");
        assert_eq!(session.trust_state(ADDR), Some(TrustState::Rejected));
        assert!(session.pending_offer(ADDR).is_none());
    }

    #[test]
    fn test_invalid_key_offer_cannot_be_accepted() {
        let session = Session::new();
        session
            .handle_unit("New Contact Request", offer_args("not a key block"))
            .expect("offer is recorded even when invalid");
        let offer = session.pending_offer(ADDR).expect("pending offer");
        assert!(!offer.is_valid);
        assert_eq!(offer.failure, Some(VerdictFailure::Malformed));

        let err = session
            .handle_unit("Accept Contact", address_args())
            .expect_err("accept refused");
        assert!(matches!(err, ExecutorError::Receiver(_)));
        assert_eq!(session.trust_state(ADDR), Some(TrustState::Validating));
    }

    #[test]
    fn test_messages_require_accepted_contact() {
        let session = offered_session();
        let mut send = address_args();
        send.insert("body".to_string(), json!("too early"));
        session
            .handle_unit("Send Message", send)
            .expect_err("send before accept");

        let mut receive = CommandArgs::new();
        receive.insert(
            "payload".to_string(),
            json!({ "address": ADDR, "body": "unsolicited" }),
        );
        session
            .handle_unit("Receive Message", receive)
            .expect_err("receive before accept");
        assert!(session.inbox_snapshot().is_empty());
    }

    #[test]
    fn test_receive_records_inbound_message() {
        let session = offered_session();
        session
            .handle_unit("Accept Contact", address_args())
            .expect("accept");
        let mut args = CommandArgs::new();
        args.insert(
            "payload".to_string(),
            json!({ "address": ADDR, "body": "hi back" }),
        );
        session.handle_unit("Receive Message", args).expect("receive");
        let inbox = session.inbox_snapshot();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].address, ADDR);
    }

    #[test]
    fn test_unknown_and_malformed_units_are_isolated() {
        let session = Session::new();
        assert!(matches!(
            session.handle_unit("Self Destruct", CommandArgs::new()),
            Err(ExecutorError::UnknownCommand(_))
        ));
        assert!(matches!(
            session.handle_unit("Accept Contact", CommandArgs::new()),
            Err(ExecutorError::InvalidArguments { .. })
        ));
        // The session still works after the bad units.
        session
            .handle_unit(
                "New Contact Request",
                offer_args(testkeys::SOTTO_FIXTURE_PUBLIC_KEY),
            )
            .expect("offer after failures");
    }

    #[test]
    fn test_events_are_emitted_in_order() {
        let session = Session::new();
        let mut rx = session.subscribe();
        session
            .handle_unit(
                "New Contact Request",
                offer_args(testkeys::SOTTO_FIXTURE_PUBLIC_KEY),
            )
            .expect("offer");
        session
            .handle_unit("Accept Contact", address_args())
            .expect("accept");

        let first = rx.try_recv().expect("first event");
        assert_eq!(first.event_type, "ContactOffered");
        let second = rx.try_recv().expect("second event");
        assert_eq!(second.event_type, "ContactAccepted");
        assert_eq!(
            second.payload["fingerprint"],
            json!(testkeys::SOTTO_FIXTURE_FINGERPRINT)
        );
    }

    #[test]
    fn test_expiry_sweep_emits_events() {
        let session = offered_session();
        let mut rx = session.subscribe();
        let expired = session.sweep_expired(0);
        assert_eq!(expired, vec![ADDR.to_string()]);
        assert_eq!(session.trust_state(ADDR), Some(TrustState::Expired));
        let event = rx.try_recv().expect("event");
        assert_eq!(event.event_type, "ContactExpired");

        // An expired contact can be offered again.
        session
            .handle_unit(
                "New Contact Request",
                offer_args(testkeys::SOTTO_FIXTURE_PUBLIC_KEY),
            )
            .expect("fresh offer");
        assert_eq!(session.trust_state(ADDR), Some(TrustState::Validating));
    }
}
