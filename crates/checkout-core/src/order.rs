//! # Order Types
//!
//! Orders and the checkout flow.
//!
//! ```text
//!  open ──add_item / remove_item──▶ open
//!  open ──checkout ok────────────▶ paid    (terminal)
//!  open ──checkout err───────────▶ failed  (terminal, see retry_as_new)
//! ```

use crate::error::{ErrorKind, PaymentError, PaymentResult};
use crate::events::{EventContext, PaymentEvent, PaymentEventSink};
use crate::history::{TransactionHistory, TransactionRecord};
use crate::ids::{ItemId, OrderId, TransactionId, UserId};
use crate::item::Item;
use crate::money::Currency;
use crate::strategy::{MethodKind, PaymentMethod, PaymentReceipt, PaymentStrategy, ValidationPolicy};
use crate::user::Customer;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Lifecycle state of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Accepting items, not yet paid
    #[default]
    Open,
    /// Payment completed
    Paid,
    /// Validation or payment failed
    Failed,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Open => "open",
            OrderState::Paid => "paid",
            OrderState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderState::Open)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's order
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    id: OrderId,
    customer_id: UserId,
    items: Vec<Item>,
    state: OrderState,
    currency: Currency,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<TransactionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<MethodKind>,
}

impl Order {
    /// Create an empty open order attributed to `customer`
    pub fn new(customer: &Customer, currency: Currency) -> Self {
        Self::for_customer(customer.id().clone(), currency)
    }

    /// Create an empty open order for a customer id
    pub fn for_customer(customer_id: UserId, currency: Currency) -> Self {
        Self {
            id: OrderId::generate(),
            customer_id,
            items: Vec::new(),
            state: OrderState::Open,
            currency,
            created_at: Utc::now(),
            transaction_id: None,
            payment_method: None,
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn customer_id(&self) -> &UserId {
        &self.customer_id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == OrderState::Open
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set once the order is paid
    pub fn transaction_id(&self) -> Option<&TransactionId> {
        self.transaction_id.as_ref()
    }

    /// Set once the order is paid
    pub fn payment_method(&self) -> Option<MethodKind> {
        self.payment_method
    }

    /// Append an item. Fails once the order is paid or failed, or if the
    /// new total would not be representable.
    pub fn add_item(&mut self, item: Item) -> PaymentResult<()> {
        self.ensure_open()?;
        if self.total().checked_add(item.subtotal()).is_none() {
            return Err(PaymentError::InvalidItem {
                reason: format!("order total overflows when adding {}", item.name()),
            });
        }
        debug!(order_id = %self.id, item = %item.name(), "Item added");
        self.items.push(item);
        Ok(())
    }

    /// Remove the first item with `item_id`; returns whether one was removed
    pub fn remove_item(&mut self, item_id: &ItemId) -> PaymentResult<bool> {
        self.ensure_open()?;
        match self.items.iter().position(|item| item.id() == item_id) {
            Some(index) => {
                self.items.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Sum of item subtotals, recomputed on every call.
    ///
    /// `add_item` keeps this sum representable.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(Item::subtotal).sum()
    }

    /// Number of lines in the order
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn ensure_open(&self) -> PaymentResult<()> {
        if self.state.is_terminal() {
            return Err(PaymentError::OrderClosed {
                order_id: self.id.clone(),
                state: self.state,
            });
        }
        Ok(())
    }

    /// Validate `method`, then debit it for `total()`.
    ///
    /// A closed or empty order is rejected before anything else happens and
    /// stays as it was. Otherwise the order ends up `Paid` or `Failed` and
    /// the outcome is appended to `history`; a failed debit leaves the
    /// method's balance untouched.
    #[instrument(
        skip(self, method, history, sink, policy),
        fields(order_id = %self.id, method = %method.kind())
    )]
    pub fn checkout(
        &mut self,
        method: &mut PaymentMethod,
        history: &mut TransactionHistory,
        sink: &dyn PaymentEventSink,
        policy: &ValidationPolicy,
    ) -> PaymentResult<PaymentReceipt> {
        self.ensure_open()?;
        if self.items.is_empty() {
            return Err(PaymentError::EmptyOrder {
                order_id: self.id.clone(),
            });
        }

        let total = self.total();
        let context = EventContext::new(
            self.id.clone(),
            total,
            self.currency,
            method,
            sink.fingerprint_key(),
        );
        sink.emit(&PaymentEvent::PaymentAttempt {
            context: context.clone(),
        });

        if let Err(invalid) = method.validate_with(policy) {
            self.state = OrderState::Failed;
            let err = PaymentError::from(invalid);
            history.record(TransactionRecord::failed(
                self.id.clone(),
                method.kind(),
                total,
                self.currency,
                &err,
            ));
            sink.emit(&PaymentEvent::ValidationError {
                context,
                message: err.to_string(),
            });
            return Err(err);
        }

        match method.execute_payment(total) {
            Ok(receipt) => {
                self.state = OrderState::Paid;
                self.transaction_id = Some(receipt.transaction_id.clone());
                self.payment_method = Some(receipt.method);
                history.record(TransactionRecord::from_receipt(
                    self.id.clone(),
                    self.currency,
                    &receipt,
                ));
                sink.emit(&PaymentEvent::PaymentSuccess {
                    context,
                    transaction_id: receipt.transaction_id.clone(),
                });
                Ok(receipt)
            }
            Err(err) => {
                self.state = OrderState::Failed;
                history.record(TransactionRecord::failed(
                    self.id.clone(),
                    method.kind(),
                    total,
                    self.currency,
                    &err,
                ));
                sink.emit(&PaymentEvent::PaymentFailure {
                    context,
                    error_kind: err.kind(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Fresh open order with the same customer, currency and items.
    ///
    /// Only failed orders can be retried; returns `None` otherwise.
    pub fn retry_as_new(&self) -> Option<Order> {
        if self.state != OrderState::Failed {
            return None;
        }
        let mut order = Order::for_customer(self.customer_id.clone(), self.currency);
        order.items = self.items.clone();
        Some(order)
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {}: {} items, Total: {}",
            self.id,
            self.item_count(),
            self.currency.format(self.total())
        )
    }
}

/// What a caller gets back from a checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Paid {
        order_id: OrderId,
        total: Decimal,
        transaction_id: TransactionId,
    },
    Failed {
        order_id: OrderId,
        error_kind: ErrorKind,
        message: String,
    },
}

impl CheckoutOutcome {
    pub fn from_result(order_id: OrderId, result: &PaymentResult<PaymentReceipt>) -> Self {
        match result {
            Ok(receipt) => CheckoutOutcome::Paid {
                order_id,
                total: receipt.amount,
                transaction_id: receipt.transaction_id.clone(),
            },
            Err(err) => CheckoutOutcome::Failed {
                order_id,
                error_kind: err.kind(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, CheckoutOutcome::Paid { .. })
    }

    pub fn order_id(&self) -> &OrderId {
        match self {
            CheckoutOutcome::Paid { order_id, .. } | CheckoutOutcome::Failed { order_id, .. } => {
                order_id
            }
        }
    }
}
