//! One receiver per command kind.
//!
//! Receivers own the mutable session state their action needs and
//! serialize access behind their own lock; the dispatcher above them
//! stays stateless. Each `execute` does no network or disk I/O — it
//! mutates session state and emits events for the UI collaborator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};

use sotto_executor::{CommandArgs, Receiver, ReceiverError};
use sotto_pgp::validator::KeyValidator;
use sotto_types::contact::{ContactOfferView, ContactRequest, ContactResponse};
use sotto_types::message::{InboundMessage, RecordedMessage};

use crate::contacts::{block_digest, ContactStore};
use crate::events::{EventBus, SessionEvent};
use crate::{unix_now, SessionError};

/// State shared by the contact-trust receivers: the contact store
/// behind its single lock, the key validator, and the event bus.
pub(crate) struct TrustContext {
    pub contacts: Mutex<ContactStore>,
    pub validator: KeyValidator,
    pub bus: EventBus,
}

impl TrustContext {
    pub fn lock_contacts(&self) -> MutexGuard<'_, ContactStore> {
        self.contacts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event_type: &str, payload: Value) {
        self.bus.emit(SessionEvent {
            event_type: event_type.to_string(),
            timestamp: unix_now(),
            payload,
        });
    }
}

/// Decode the `payload` argument into a typed wire record.
fn decode_payload<T: DeserializeOwned>(args: &CommandArgs) -> Result<T, ReceiverError> {
    let value = args.get("payload").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| ReceiverError::new(SessionError::BadPayload(e.to_string())))
}

/// Read a plain string argument.
fn string_arg<'a>(args: &'a CommandArgs, key: &str) -> Result<&'a str, ReceiverError> {
    args.get(key).and_then(Value::as_str).ok_or_else(|| {
        ReceiverError::new(SessionError::BadPayload(format!(
            "{key} must be a string"
        )))
    })
}

/// Shared offer path for contact requests and responses: validate the
/// offered block, record the offer + verdict atomically under the
/// store's lock, then surface the offer view to the UI.
fn handle_offer(
    ctx: &TrustContext,
    address: &str,
    key_block: &[u8],
    origin: &str,
) -> Result<Value, SessionError> {
    let verdict = ctx.validator.validate(key_block);
    let digest = block_digest(key_block);
    {
        let mut contacts = ctx.lock_contacts();
        contacts.offer(address, key_block, unix_now())?;
        contacts.record_verdict(address, verdict.clone(), digest)?;
    }

    let view = ContactOfferView {
        address: address.to_string(),
        identity: verdict.identity.clone(),
        is_valid: verdict.is_valid,
        failure: verdict.failure,
    };
    if verdict.is_valid {
        info!(address, origin, "contact key offered, awaiting decision");
    } else {
        warn!(address, origin, failure = ?verdict.failure, "invalid contact key offered");
    }
    ctx.emit("ContactOffered", json!({ "origin": origin, "offer": view }));

    Ok(json!({ "address": address, "is_valid": verdict.is_valid }))
}

/// "New Contact Request": a stranger offers their key and asks to
/// become a contact.
pub(crate) struct NewContactRequestReceiver {
    ctx: Arc<TrustContext>,
}

impl NewContactRequestReceiver {
    pub fn new(ctx: Arc<TrustContext>) -> Self {
        Self { ctx }
    }
}

impl Receiver for NewContactRequestReceiver {
    fn execute(&self, args: &CommandArgs) -> Result<Value, ReceiverError> {
        let request: ContactRequest = decode_payload(args)?;
        handle_offer(
            &self.ctx,
            &request.address,
            request.key_block.as_bytes(),
            "request",
        )
        .map_err(ReceiverError::new)
    }
}

/// "New Contact Response": a peer answered our request with their own
/// key, which goes through the same validation and decision flow.
pub(crate) struct NewContactResponseReceiver {
    ctx: Arc<TrustContext>,
}

impl NewContactResponseReceiver {
    pub fn new(ctx: Arc<TrustContext>) -> Self {
        Self { ctx }
    }
}

impl Receiver for NewContactResponseReceiver {
    fn execute(&self, args: &CommandArgs) -> Result<Value, ReceiverError> {
        let response: ContactResponse = decode_payload(args)?;
        handle_offer(
            &self.ctx,
            &response.address,
            response.key_block.as_bytes(),
            "response",
        )
        .map_err(ReceiverError::new)
    }
}

/// "Accept Contact": the user's go decision.
pub(crate) struct AcceptContactReceiver {
    ctx: Arc<TrustContext>,
}

impl AcceptContactReceiver {
    pub fn new(ctx: Arc<TrustContext>) -> Self {
        Self { ctx }
    }
}

impl Receiver for AcceptContactReceiver {
    fn execute(&self, args: &CommandArgs) -> Result<Value, ReceiverError> {
        let address = string_arg(args, "address")?;
        let fingerprint = {
            let mut contacts = self.ctx.lock_contacts();
            let entry = contacts
                .accept(address, unix_now())
                .map_err(ReceiverError::new)?;
            entry
                .verdict
                .as_ref()
                .and_then(|v| v.identity.as_ref())
                .map(|i| i.fingerprint.clone())
        };
        info!(address, "contact accepted");
        self.ctx.emit(
            "ContactAccepted",
            json!({ "address": address, "fingerprint": fingerprint }),
        );
        Ok(json!({ "address": address, "state": "accepted" }))
    }
}

/// "Reject Contact": the user's no-go decision.
pub(crate) struct RejectContactReceiver {
    ctx: Arc<TrustContext>,
}

impl RejectContactReceiver {
    pub fn new(ctx: Arc<TrustContext>) -> Self {
        Self { ctx }
    }
}

impl Receiver for RejectContactReceiver {
    fn execute(&self, args: &CommandArgs) -> Result<Value, ReceiverError> {
        let address = string_arg(args, "address")?;
        {
            let mut contacts = self.ctx.lock_contacts();
            contacts
                .reject(address, unix_now())
                .map_err(ReceiverError::new)?;
        }
        info!(address, "contact rejected");
        self.ctx
            .emit("ContactRejected", json!({ "address": address }));
        Ok(json!({ "address": address, "state": "rejected" }))
    }
}

/// "Send Message": queue an outbound message for an accepted contact.
/// Actual delivery belongs to the transport collaborator.
pub(crate) struct SendMessageReceiver {
    ctx: Arc<TrustContext>,
    outbox: Arc<Mutex<Vec<RecordedMessage>>>,
}

impl SendMessageReceiver {
    pub fn new(ctx: Arc<TrustContext>, outbox: Arc<Mutex<Vec<RecordedMessage>>>) -> Self {
        Self { ctx, outbox }
    }
}

impl Receiver for SendMessageReceiver {
    fn execute(&self, args: &CommandArgs) -> Result<Value, ReceiverError> {
        let address = string_arg(args, "address")?;
        let body = string_arg(args, "body")?;

        if !self.ctx.lock_contacts().is_accepted(address) {
            return Err(ReceiverError::new(SessionError::ContactNotTrusted {
                address: address.to_string(),
            }));
        }

        let message = RecordedMessage {
            address: address.to_string(),
            body: body.to_string(),
            recorded_at: unix_now(),
        };
        let queued = {
            let mut outbox = self
                .outbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            outbox.push(message);
            outbox.len()
        };
        self.ctx
            .emit("MessageQueued", json!({ "address": address }));
        Ok(json!({ "address": address, "queued": queued }))
    }
}

/// "Receive Message": record an inbound message from an accepted
/// contact. Messages from peers the user never accepted are refused.
pub(crate) struct ReceiveMessageReceiver {
    ctx: Arc<TrustContext>,
    inbox: Arc<Mutex<Vec<RecordedMessage>>>,
}

impl ReceiveMessageReceiver {
    pub fn new(ctx: Arc<TrustContext>, inbox: Arc<Mutex<Vec<RecordedMessage>>>) -> Self {
        Self { ctx, inbox }
    }
}

impl Receiver for ReceiveMessageReceiver {
    fn execute(&self, args: &CommandArgs) -> Result<Value, ReceiverError> {
        let inbound: InboundMessage = decode_payload(args)?;

        if !self.ctx.lock_contacts().is_accepted(&inbound.address) {
            warn!(address = %inbound.address, "message from non-accepted peer dropped");
            return Err(ReceiverError::new(SessionError::ContactNotTrusted {
                address: inbound.address,
            }));
        }

        let message = RecordedMessage {
            address: inbound.address.clone(),
            body: inbound.body,
            recorded_at: unix_now(),
        };
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        self.ctx
            .emit("MessageReceived", json!({ "address": inbound.address }));
        Ok(json!({ "address": inbound.address, "recorded": true }))
    }
}
