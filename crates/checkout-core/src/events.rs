//! # Payment Events
//!
//! Checkout reports what happened through an injected `PaymentEventSink`.
//! Events carry the order id, amount, currency, method kind and a masked
//! instrument identifier. Raw card numbers, CVVs and password tokens never
//! reach an event.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_core::events::TracingEventSink;
//!
//! let sink = TracingEventSink::new();
//! order.checkout(&mut wallet, &mut history, &sink, &policy)?;
//! ```

use crate::error::ErrorKind;
use crate::ids::{OrderId, TransactionId};
use crate::masking::{masked_identifier, method_fingerprint};
use crate::money::Currency;
use crate::strategy::{MethodKind, PaymentMethod, PaymentStrategy};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Serialize;
use std::sync::Mutex;
use tracing::{info, warn};

/// Fields shared by every event of one checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventContext {
    pub order_id: OrderId,
    pub amount: Decimal,
    pub currency: Currency,
    pub method: MethodKind,
    /// Masked instrument identifier
    pub instrument: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl EventContext {
    pub fn new(
        order_id: OrderId,
        amount: Decimal,
        currency: Currency,
        method: &PaymentMethod,
        fingerprint_key: Option<&SecretString>,
    ) -> Self {
        Self {
            order_id,
            amount,
            currency,
            method: method.kind(),
            instrument: masked_identifier(method),
            fingerprint: fingerprint_key.map(|key| method_fingerprint(key, method)),
        }
    }
}

/// Structured checkout event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PaymentEvent {
    PaymentAttempt {
        #[serde(flatten)]
        context: EventContext,
    },
    PaymentSuccess {
        #[serde(flatten)]
        context: EventContext,
        transaction_id: TransactionId,
    },
    PaymentFailure {
        #[serde(flatten)]
        context: EventContext,
        error_kind: ErrorKind,
        message: String,
    },
    ValidationError {
        #[serde(flatten)]
        context: EventContext,
        message: String,
    },
}

impl PaymentEvent {
    /// Event name as it appears in logs
    pub fn name(&self) -> &'static str {
        match self {
            PaymentEvent::PaymentAttempt { .. } => "payment_attempt",
            PaymentEvent::PaymentSuccess { .. } => "payment_success",
            PaymentEvent::PaymentFailure { .. } => "payment_failure",
            PaymentEvent::ValidationError { .. } => "validation_error",
        }
    }

    pub fn context(&self) -> &EventContext {
        match self {
            PaymentEvent::PaymentAttempt { context }
            | PaymentEvent::PaymentSuccess { context, .. }
            | PaymentEvent::PaymentFailure { context, .. }
            | PaymentEvent::ValidationError { context, .. } => context,
        }
    }
}

/// Receiver for checkout events
///
/// Every method has a logging default; override `emit` to capture events
/// wholesale, or a single `on_*` method to react to one kind.
pub trait PaymentEventSink: Send + Sync {
    /// Key for instrument fingerprints; `None` disables them
    fn fingerprint_key(&self) -> Option<&SecretString> {
        None
    }

    fn on_payment_attempt(&self, context: &EventContext) {
        info!(
            event = "payment_attempt",
            order_id = %context.order_id,
            amount = %context.amount,
            currency = %context.currency,
            method = %context.method,
            instrument = %context.instrument,
            fingerprint = context.fingerprint.as_deref(),
            "Payment attempt"
        );
    }

    fn on_payment_success(&self, context: &EventContext, transaction_id: &TransactionId) {
        info!(
            event = "payment_success",
            order_id = %context.order_id,
            amount = %context.amount,
            currency = %context.currency,
            method = %context.method,
            instrument = %context.instrument,
            transaction_id = %transaction_id,
            "Payment succeeded"
        );
    }

    fn on_payment_failure(&self, context: &EventContext, error_kind: ErrorKind, message: &str) {
        warn!(
            event = "payment_failure",
            order_id = %context.order_id,
            amount = %context.amount,
            currency = %context.currency,
            method = %context.method,
            instrument = %context.instrument,
            error_kind = %error_kind,
            "Payment failed: {}",
            message
        );
    }

    fn on_validation_error(&self, context: &EventContext, message: &str) {
        warn!(
            event = "validation_error",
            order_id = %context.order_id,
            method = %context.method,
            instrument = %context.instrument,
            "Payment method rejected: {}",
            message
        );
    }

    /// Route an event to its `on_*` method
    fn emit(&self, event: &PaymentEvent) {
        match event {
            PaymentEvent::PaymentAttempt { context } => self.on_payment_attempt(context),
            PaymentEvent::PaymentSuccess {
                context,
                transaction_id,
            } => self.on_payment_success(context, transaction_id),
            PaymentEvent::PaymentFailure {
                context,
                error_kind,
                message,
            } => self.on_payment_failure(context, *error_kind, message),
            PaymentEvent::ValidationError { context, message } => {
                self.on_validation_error(context, message)
            }
        }
    }
}

/// Sink that writes every event through `tracing`
#[derive(Default)]
pub struct TracingEventSink {
    fingerprint_key: Option<SecretString>,
}

impl TracingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add an HMAC fingerprint to each event
    pub fn with_fingerprint_key(mut self, key: SecretString) -> Self {
        self.fingerprint_key = Some(key);
        self
    }
}

impl PaymentEventSink for TracingEventSink {
    fn fingerprint_key(&self) -> Option<&SecretString> {
        self.fingerprint_key.as_ref()
    }
}

/// Sink that keeps events in memory (tests, the scenario runner)
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PaymentEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<PaymentEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Names of emitted events, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(PaymentEvent::name).collect()
    }
}

impl PaymentEventSink for RecordingSink {
    fn emit(&self, event: &PaymentEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
