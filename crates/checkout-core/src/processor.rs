//! # Payment Processor
//!
//! Facade over `Customer::checkout` that owns the event sink and the
//! validation policy and hands back a serializable `CheckoutOutcome`
//! instead of a `Result`.

use crate::error::ValidationError;
use crate::events::PaymentEventSink;
use crate::ids::OrderId;
use crate::order::{CheckoutOutcome, Order};
use crate::strategy::{MethodKind, PaymentStrategy, ValidationPolicy};
use crate::user::Customer;
use tracing::{info, warn};

/// Runs checkouts for customers
pub struct PaymentProcessor<S> {
    sink: S,
    policy: ValidationPolicy,
}

impl<S: PaymentEventSink> PaymentProcessor<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            policy: ValidationPolicy::lenient(),
        }
    }

    /// Builder: set the validation policy (e.g. reject expired cards)
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Pay one of `customer`'s orders with the wallet of `kind`
    pub fn process(
        &self,
        customer: &mut Customer,
        order_id: &OrderId,
        kind: MethodKind,
    ) -> CheckoutOutcome {
        let result = customer.checkout(order_id, kind, &self.sink, &self.policy);
        let outcome = CheckoutOutcome::from_result(order_id.clone(), &result);
        log_outcome(&outcome);
        outcome
    }

    /// Pay an order held outside the customer
    pub fn process_order(
        &self,
        customer: &mut Customer,
        order: &mut Order,
        kind: MethodKind,
    ) -> CheckoutOutcome {
        let result = customer.pay(order, kind, &self.sink, &self.policy);
        let outcome = CheckoutOutcome::from_result(order.id().clone(), &result);
        log_outcome(&outcome);
        outcome
    }

    /// Validate every wallet the customer holds without paying
    pub fn validate_wallets(
        &self,
        customer: &Customer,
    ) -> Vec<(MethodKind, Result<(), ValidationError>)> {
        customer
            .wallets()
            .map(|method| (method.kind(), method.validate_with(&self.policy)))
            .collect()
    }
}

fn log_outcome(outcome: &CheckoutOutcome) {
    match outcome {
        CheckoutOutcome::Paid {
            order_id,
            total,
            transaction_id,
        } => info!(
            order_id = %order_id,
            total = %total,
            transaction_id = %transaction_id,
            "Checkout completed"
        ),
        CheckoutOutcome::Failed {
            order_id,
            error_kind,
            message,
        } => warn!(
            order_id = %order_id,
            error_kind = %error_kind,
            "Checkout failed: {}",
            message
        ),
    }
}
