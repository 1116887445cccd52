//! # checkout-core
//!
//! Core types and traits for the strategy-checkout payment engine.
//!
//! This crate provides:
//! - `Item` and `ItemCatalog` for priced order lines
//! - `Order` with its open → paid | failed lifecycle
//! - `PaymentStrategy` trait with credit card, PayPal and crypto methods
//! - `Customer` and `Admin` users
//! - `PaymentEventSink` for masked, structured checkout events
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{CreditCard, Currency, Customer, Item, MethodKind, TracingEventSink, ValidationPolicy};
//! use rust_decimal_macros::dec;
//!
//! let mut customer = Customer::new("John Doe", "john@example.com");
//! customer.add_wallet(CreditCard::new("4111111111111111", "12/25", "123").with_balance(dec!(2000))?);
//!
//! let order_id = customer.open_order(Currency::USD)?;
//! customer.add_item(&order_id, Item::new("Laptop", dec!(999.99), 1)?)?;
//! customer.add_item(&order_id, Item::new("Mouse", dec!(29.99), 2)?)?;
//!
//! let receipt = customer.checkout(
//!     &order_id,
//!     MethodKind::CreditCard,
//!     &TracingEventSink::new(),
//!     &ValidationPolicy::lenient(),
//! )?;
//! assert_eq!(receipt.balance_after, dec!(940.03));
//! ```

pub mod error;
pub mod events;
pub mod history;
pub mod ids;
pub mod item;
pub mod masking;
pub mod methods;
pub mod money;
pub mod order;
pub mod processor;
pub mod strategy;
pub mod user;

// Re-exports for convenience
pub use error::{ErrorKind, PaymentError, PaymentResult, ValidationError};
pub use events::{EventContext, PaymentEvent, PaymentEventSink, RecordingSink, TracingEventSink};
pub use history::{TransactionHistory, TransactionRecord, TransactionStatus};
pub use ids::{ItemId, OrderId, TransactionId, UserId};
pub use item::{CatalogEntry, Item, ItemCatalog};
pub use methods::{CreditCard, Crypto, CryptoNetwork, MethodSpec, PayPal, PaymentFactory};
pub use money::Currency;
pub use order::{CheckoutOutcome, Order, OrderState};
pub use processor::PaymentProcessor;
pub use strategy::{
    Balance, MethodKind, PaymentMethod, PaymentReceipt, PaymentStrategy, ValidationPolicy,
};
pub use user::{Admin, Customer, Permission, PermissionLevel, Role, User, UserProfile};
