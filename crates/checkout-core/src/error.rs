//! # Payment Error Types
//!
//! Typed error handling for the checkout engine.
//! All checkout operations return `Result<T, PaymentError>`.

use crate::ids::{OrderId, UserId};
use crate::order::OrderState;
use crate::strategy::MethodKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Credential problems reported by a payment method's `validate()`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Card number is not exactly 16 digits
    #[error("card number must be exactly 16 digits")]
    InvalidCardNumber,

    /// CVV is not 3 or 4 digits
    #[error("cvv must be 3 or 4 digits")]
    InvalidCvv,

    /// Expiry is not MM/YY with a month between 01 and 12
    #[error("invalid expiry date: {value}")]
    InvalidExpiry { value: String },

    /// Expiry month lies before the reference date
    #[error("card expired at end of {value}")]
    ExpiredCard { value: String },

    /// Holder name was set but is not "Prefix Firstname Lastname"
    #[error("card holder must be \"Prefix Firstname Lastname\": {value}")]
    InvalidCardHolder { value: String },

    /// Email does not look like local@domain.tld
    #[error("invalid email address")]
    InvalidEmail,

    /// PayPal account has not been verified
    #[error("account is not verified")]
    AccountNotVerified,

    /// Password token is shorter than 8 chars or lacks a letter or digit
    #[error("password token is not strong enough")]
    WeakPassword,

    /// Wallet address too short or malformed for its network
    #[error("invalid wallet address for {network}")]
    InvalidWalletAddress { network: String },

    /// Network is not one we can validate addresses for
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),
}

/// Core error type for all checkout operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Item constructed with a negative price, zero quantity or no name
    #[error("Invalid item: {reason}")]
    InvalidItem { reason: String },

    /// Mutation or checkout attempted after the order reached a terminal state
    #[error("Order {order_id} is closed ({state})")]
    OrderClosed { order_id: OrderId, state: OrderState },

    /// Checkout attempted on an order with no items
    #[error("Order {order_id} has no items")]
    EmptyOrder { order_id: OrderId },

    /// Method credentials are malformed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Balance is below the amount to debit
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    /// Negative debit, non-positive deposit or negative starting balance
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: Decimal },

    /// Order belongs to a different customer
    #[error("Order {order_id} does not belong to customer {customer_id}")]
    CustomerMismatch { order_id: OrderId, customer_id: UserId },

    /// No order with this id is owned by the customer
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: OrderId },

    /// Customer has no wallet for the requested method
    #[error("No {method} wallet configured")]
    WalletNotFound { method: MethodKind },

    /// User has been deactivated
    #[error("User {user_id} is inactive")]
    InactiveUser { user_id: UserId },

    /// Admin lacks the permission for this query
    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    /// Configuration errors (bad env values, unreadable scenario)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Stable, serializable discriminant of a `PaymentError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidItem,
    OrderClosed,
    EmptyOrder,
    Validation,
    InsufficientFunds,
    InvalidAmount,
    CustomerMismatch,
    OrderNotFound,
    WalletNotFound,
    InactiveUser,
    PermissionDenied,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidItem => "invalid_item",
            ErrorKind::OrderClosed => "order_closed",
            ErrorKind::EmptyOrder => "empty_order",
            ErrorKind::Validation => "validation",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::InvalidAmount => "invalid_amount",
            ErrorKind::CustomerMismatch => "customer_mismatch",
            ErrorKind::OrderNotFound => "order_not_found",
            ErrorKind::WalletNotFound => "wallet_not_found",
            ErrorKind::InactiveUser => "inactive_user",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaymentError {
    /// Returns the error's discriminant
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::InvalidItem { .. } => ErrorKind::InvalidItem,
            PaymentError::OrderClosed { .. } => ErrorKind::OrderClosed,
            PaymentError::EmptyOrder { .. } => ErrorKind::EmptyOrder,
            PaymentError::Validation(_) => ErrorKind::Validation,
            PaymentError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            PaymentError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            PaymentError::CustomerMismatch { .. } => ErrorKind::CustomerMismatch,
            PaymentError::OrderNotFound { .. } => ErrorKind::OrderNotFound,
            PaymentError::WalletNotFound { .. } => ErrorKind::WalletNotFound,
            PaymentError::InactiveUser { .. } => ErrorKind::InactiveUser,
            PaymentError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            PaymentError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Returns true if a new attempt with the same credentials could succeed.
    ///
    /// Nothing in this crate retries on its own; callers build a new order
    /// (see `Order::retry_as_new`) once the wallet has been topped up.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::InsufficientFunds { .. })
    }

    /// Returns the validation detail, if this is a validation failure
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            PaymentError::Validation(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Result type alias for checkout operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_retryable_errors() {
        assert!(PaymentError::InsufficientFunds {
            required: dec!(10),
            available: dec!(5)
        }
        .is_retryable());
        assert!(!PaymentError::Validation(ValidationError::InvalidCvv).is_retryable());
        assert!(!PaymentError::InvalidItem {
            reason: "bad".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            PaymentError::Validation(ValidationError::InvalidEmail).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            PaymentError::EmptyOrder {
                order_id: OrderId::from("ORD-1")
            }
            .kind()
            .as_str(),
            "empty_order"
        );
        assert_eq!(
            serde_json::to_string(&ErrorKind::InsufficientFunds).unwrap(),
            "\"insufficient_funds\""
        );
    }

    #[test]
    fn test_validation_conversion() {
        let err: PaymentError = ValidationError::InvalidCardNumber.into();
        assert_eq!(err.validation(), Some(&ValidationError::InvalidCardNumber));
        assert_eq!(
            err.to_string(),
            "Validation failed: card number must be exactly 16 digits"
        );
    }
}
