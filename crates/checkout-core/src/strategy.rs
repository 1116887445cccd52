//! # Payment Strategy Trait
//!
//! Strategy pattern for the payment methods a customer can pay with.
//! Implementations: credit card, PayPal, crypto wallet.
//!
//! ## Design Pattern
//!
//! Every method shares one two-call protocol, `validate()` then
//! `execute_payment(amount)`, so `Order::checkout` never needs to know which
//! variant it was handed. The variants themselves are plain records; the
//! `PaymentMethod` enum dispatches statically over them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentStrategy (trait)                   │
//! │  ├── validate_with() / validate()                           │
//! │  ├── execute_payment()                                      │
//! │  └── deposit() / balance()                                  │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┼─────────────────┐
//!          │                 │                 │
//!  ┌───────┴───────┐ ┌───────┴───────┐ ┌───────┴───────┐
//!  │  CreditCard   │ │    PayPal     │ │    Crypto     │
//!  └───────────────┘ └───────────────┘ └───────────────┘
//! ```

use crate::error::{PaymentError, PaymentResult, ValidationError};
use crate::ids::TransactionId;
use crate::methods::{CreditCard, Crypto, PayPal};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which kind of payment method a wallet holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MethodKind {
    #[serde(rename = "credit_card")]
    CreditCard,
    #[serde(rename = "paypal")]
    PayPal,
    #[serde(rename = "crypto")]
    Crypto,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::CreditCard => "credit_card",
            MethodKind::PayPal => "paypal",
            MethodKind::Crypto => "crypto",
        }
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-negative balance held by a payment method.
///
/// Debits are all-or-nothing: a debit larger than the balance fails and
/// leaves the balance untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Balance(Decimal);

impl Balance {
    pub fn new(amount: Decimal) -> PaymentResult<Self> {
        if amount < Decimal::ZERO {
            return Err(PaymentError::InvalidAmount { amount });
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Remove `amount`, returning the new balance
    pub fn debit(&mut self, amount: Decimal) -> PaymentResult<Decimal> {
        if amount < Decimal::ZERO {
            return Err(PaymentError::InvalidAmount { amount });
        }
        if amount > self.0 {
            return Err(PaymentError::InsufficientFunds {
                required: amount,
                available: self.0,
            });
        }
        self.0 -= amount;
        Ok(self.0)
    }

    /// Add a strictly positive `amount`, returning the new balance.
    /// A credit that would overflow is rejected and leaves the balance as is.
    pub fn credit(&mut self, amount: Decimal) -> PaymentResult<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount { amount });
        }
        self.0 = self
            .0
            .checked_add(amount)
            .ok_or(PaymentError::InvalidAmount { amount })?;
        Ok(self.0)
    }
}

impl TryFrom<Decimal> for Balance {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Balance::new(value)
    }
}

impl From<Balance> for Decimal {
    fn from(value: Balance) -> Self {
        value.0
    }
}

/// Extra checks applied during validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// When set, cards whose expiry month ends before this date are rejected
    pub expiry_reference: Option<NaiveDate>,
}

impl ValidationPolicy {
    /// Format checks only; expiry dates are not compared with the calendar
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Also reject cards that expired before `today`
    pub fn rejecting_expired(today: NaiveDate) -> Self {
        Self {
            expiry_reference: Some(today),
        }
    }
}

/// Result of a successful debit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: TransactionId,
    pub method: MethodKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub processed_at: DateTime<Utc>,
}

/// Capability set shared by every payment method.
pub trait PaymentStrategy {
    /// Which variant this is (for logging and wallet lookup)
    fn kind(&self) -> MethodKind;

    /// Check credentials under the given policy
    fn validate_with(&self, policy: &ValidationPolicy) -> Result<(), ValidationError>;

    fn balance_ref(&self) -> &Balance;

    fn balance_mut(&mut self) -> &mut Balance;

    /// Check credentials (format only)
    fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(&ValidationPolicy::lenient())
    }

    fn balance(&self) -> Decimal {
        self.balance_ref().amount()
    }

    /// Debit `amount`, failing with `InsufficientFunds` if the balance is short.
    ///
    /// Credentials are not re-checked here; callers run `validate()` first.
    fn execute_payment(&mut self, amount: Decimal) -> PaymentResult<PaymentReceipt> {
        let balance_after = self.balance_mut().debit(amount)?;
        Ok(PaymentReceipt {
            transaction_id: TransactionId::generate(),
            method: self.kind(),
            amount,
            balance_after,
            processed_at: Utc::now(),
        })
    }

    /// Add funds to the method's balance
    fn deposit(&mut self, amount: Decimal) -> PaymentResult<Decimal> {
        self.balance_mut().credit(amount)
    }
}

/// A configured payment method
#[derive(Debug)]
pub enum PaymentMethod {
    CreditCard(CreditCard),
    PayPal(PayPal),
    Crypto(Crypto),
}

impl PaymentStrategy for PaymentMethod {
    fn kind(&self) -> MethodKind {
        match self {
            PaymentMethod::CreditCard(_) => MethodKind::CreditCard,
            PaymentMethod::PayPal(_) => MethodKind::PayPal,
            PaymentMethod::Crypto(_) => MethodKind::Crypto,
        }
    }

    fn validate_with(&self, policy: &ValidationPolicy) -> Result<(), ValidationError> {
        match self {
            PaymentMethod::CreditCard(card) => card.validate_with(policy),
            PaymentMethod::PayPal(account) => account.validate_with(policy),
            PaymentMethod::Crypto(wallet) => wallet.validate_with(policy),
        }
    }

    fn balance_ref(&self) -> &Balance {
        match self {
            PaymentMethod::CreditCard(card) => card.balance_ref(),
            PaymentMethod::PayPal(account) => account.balance_ref(),
            PaymentMethod::Crypto(wallet) => wallet.balance_ref(),
        }
    }

    fn balance_mut(&mut self) -> &mut Balance {
        match self {
            PaymentMethod::CreditCard(card) => card.balance_mut(),
            PaymentMethod::PayPal(account) => account.balance_mut(),
            PaymentMethod::Crypto(wallet) => wallet.balance_mut(),
        }
    }
}

impl From<CreditCard> for PaymentMethod {
    fn from(card: CreditCard) -> Self {
        PaymentMethod::CreditCard(card)
    }
}

impl From<PayPal> for PaymentMethod {
    fn from(account: PayPal) -> Self {
        PaymentMethod::PayPal(account)
    }
}

impl From<Crypto> for PaymentMethod {
    fn from(wallet: Crypto) -> Self {
        PaymentMethod::Crypto(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_debit_is_all_or_nothing() {
        let mut balance = Balance::new(dec!(100)).unwrap();

        for _ in 0..3 {
            assert!(matches!(
                balance.debit(dec!(100.01)),
                Err(PaymentError::InsufficientFunds { .. })
            ));
            assert_eq!(balance.amount(), dec!(100));
        }

        assert_eq!(balance.debit(dec!(100)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_balance_rejects_negative() {
        assert!(Balance::new(dec!(-0.01)).is_err());

        let mut balance = Balance::default();
        assert!(matches!(
            balance.debit(dec!(-5)),
            Err(PaymentError::InvalidAmount { .. })
        ));
        assert!(balance.credit(Decimal::ZERO).is_err());
        assert_eq!(balance.credit(dec!(12.5)).unwrap(), dec!(12.5));
    }

    #[test]
    fn test_credit_overflow_rejected() {
        let mut balance = Balance::new(Decimal::MAX).unwrap();
        assert!(matches!(
            balance.credit(dec!(1)),
            Err(PaymentError::InvalidAmount { .. })
        ));
        assert_eq!(balance.amount(), Decimal::MAX);
    }

    #[test]
    fn test_method_kind_serde() {
        assert_eq!(
            serde_json::to_string(&MethodKind::PayPal).unwrap(),
            "\"paypal\""
        );
        assert_eq!(
            serde_json::from_str::<MethodKind>("\"credit_card\"").unwrap(),
            MethodKind::CreditCard
        );
    }

    #[test]
    fn test_enum_dispatch() {
        let mut method = PaymentMethod::from(
            CreditCard::new("4111111111111111", "12/25", "123")
                .with_balance(dec!(50))
                .unwrap(),
        );

        assert_eq!(method.kind(), MethodKind::CreditCard);
        assert!(method.validate().is_ok());

        let receipt = method.execute_payment(dec!(20)).unwrap();
        assert_eq!(receipt.amount, dec!(20));
        assert_eq!(receipt.balance_after, dec!(30));
        assert_eq!(method.balance(), dec!(30));
    }
}
