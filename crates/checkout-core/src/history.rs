//! Append-only transaction log kept per customer.
//!
//! Every checkout that gets past its preconditions leaves one record here,
//! whether it was paid or not.

use crate::error::{ErrorKind, PaymentError};
use crate::ids::{OrderId, TransactionId};
use crate::money::Currency;
use crate::strategy::{MethodKind, PaymentReceipt};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status of a recorded transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Failed,
}

/// One checkout outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub order_id: OrderId,
    pub method: MethodKind,
    /// Amount debited, or attempted for a failed record
    pub amount: Decimal,
    pub currency: Currency,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn from_receipt(order_id: OrderId, currency: Currency, receipt: &PaymentReceipt) -> Self {
        Self {
            transaction_id: receipt.transaction_id.clone(),
            order_id,
            method: receipt.method,
            amount: receipt.amount,
            currency,
            status: TransactionStatus::Completed,
            error_kind: None,
            error: None,
            recorded_at: receipt.processed_at,
        }
    }

    /// A checkout that failed validation or the debit
    pub fn failed(
        order_id: OrderId,
        method: MethodKind,
        amount: Decimal,
        currency: Currency,
        err: &PaymentError,
    ) -> Self {
        Self {
            transaction_id: TransactionId::generate(),
            order_id,
            method,
            amount,
            currency,
            status: TransactionStatus::Failed,
            error_kind: Some(err.kind()),
            error: Some(err.to_string()),
            recorded_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// Records are only ever appended
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionHistory {
    entries: Vec<TransactionRecord>,
}

impl TransactionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: TransactionRecord) {
        self.entries.push(record);
    }

    pub fn entries(&self) -> &[TransactionRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Completed records only
    pub fn completed(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.entries.iter().filter(|r| r.is_completed())
    }

    /// Sum of completed amounts, `None` if it overflows.
    /// Only meaningful for single-currency histories.
    pub fn total_spent(&self) -> Option<Decimal> {
        self.completed()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn receipt(amount: Decimal) -> PaymentReceipt {
        PaymentReceipt {
            transaction_id: TransactionId::generate(),
            method: MethodKind::PayPal,
            amount,
            balance_after: Decimal::ZERO,
            processed_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_and_total() {
        let mut history = TransactionHistory::new();
        assert!(history.is_empty());

        history.record(TransactionRecord::from_receipt(
            OrderId::from("ORD-1"),
            Currency::USD,
            &receipt(dec!(10.50)),
        ));
        history.record(TransactionRecord::from_receipt(
            OrderId::from("ORD-2"),
            Currency::USD,
            &receipt(dec!(4.50)),
        ));

        history.record(TransactionRecord::failed(
            OrderId::from("ORD-3"),
            MethodKind::PayPal,
            dec!(99),
            Currency::USD,
            &PaymentError::InsufficientFunds {
                required: dec!(99),
                available: dec!(0),
            },
        ));

        assert_eq!(history.len(), 3);
        assert_eq!(history.entries()[0].order_id, OrderId::from("ORD-1"));
        assert_eq!(history.completed().count(), 2);
        assert_eq!(history.total_spent(), Some(dec!(15)));
    }

    #[test]
    fn test_total_spent_overflow() {
        let mut history = TransactionHistory::new();
        for order in ["ORD-1", "ORD-2"] {
            history.record(TransactionRecord::from_receipt(
                OrderId::from(order),
                Currency::USD,
                &receipt(Decimal::MAX),
            ));
        }
        assert_eq!(history.total_spent(), None);
    }

    #[test]
    fn test_record_serializes_status() {
        let record =
            TransactionRecord::from_receipt(OrderId::from("ORD-1"), Currency::EUR, &receipt(dec!(1)));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["currency"], "eur");
        assert_eq!(json["method"], "paypal");
        assert!(json.get("error_kind").is_none());

        let failed = TransactionRecord::failed(
            OrderId::from("ORD-2"),
            MethodKind::CreditCard,
            dec!(5),
            Currency::USD,
            &PaymentError::EmptyOrder {
                order_id: OrderId::from("ORD-2"),
            },
        );
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error_kind"], "empty_order");
        assert_eq!(json["error"], "Order ORD-2 has no items");
    }
}
