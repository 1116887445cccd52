//! # Payment Methods
//!
//! The three concrete strategies plus a factory that builds them from
//! configuration.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_core::methods::{MethodSpec, PaymentFactory};
//!
//! let spec: MethodSpec = toml::from_str(r#"
//!     type = "credit_card"
//!     number = "4111111111111111"
//!     expiry = "12/25"
//!     cvv = "123"
//!     balance = "2000"
//! "#)?;
//!
//! let method = PaymentFactory::create(spec)?;
//! ```

pub mod credit_card;
pub mod crypto;
pub mod paypal;

pub use credit_card::CreditCard;
pub use crypto::{Crypto, CryptoNetwork};
pub use paypal::PayPal;

use crate::error::PaymentResult;
use crate::strategy::{MethodKind, PaymentMethod, PaymentStrategy};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Declarative description of a payment method (scenario files, fixtures).
///
/// Not `Debug`: holds raw card numbers and tokens.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodSpec {
    CreditCard {
        number: String,
        expiry: String,
        cvv: String,
        #[serde(default)]
        holder: Option<String>,
        #[serde(default)]
        balance: Decimal,
    },
    #[serde(rename = "paypal")]
    PayPal {
        email: String,
        #[serde(default)]
        verified: bool,
        #[serde(default)]
        password_token: Option<String>,
        #[serde(default)]
        balance: Decimal,
    },
    Crypto {
        wallet_address: String,
        network: String,
        #[serde(default)]
        balance: Decimal,
    },
}

impl MethodSpec {
    pub fn kind(&self) -> MethodKind {
        match self {
            MethodSpec::CreditCard { .. } => MethodKind::CreditCard,
            MethodSpec::PayPal { .. } => MethodKind::PayPal,
            MethodSpec::Crypto { .. } => MethodKind::Crypto,
        }
    }
}

/// Builds payment methods from `MethodSpec`s
pub struct PaymentFactory;

impl PaymentFactory {
    /// Kinds this factory can build
    pub const SUPPORTED: [MethodKind; 3] =
        [MethodKind::CreditCard, MethodKind::PayPal, MethodKind::Crypto];

    /// Build without checking credentials (balance and network are still checked)
    pub fn build(spec: MethodSpec) -> PaymentResult<PaymentMethod> {
        let method = match spec {
            MethodSpec::CreditCard {
                number,
                expiry,
                cvv,
                holder,
                balance,
            } => {
                let mut card = CreditCard::new(number, expiry, cvv);
                if let Some(holder) = holder {
                    card = card.with_holder(holder);
                }
                PaymentMethod::from(card.with_balance(balance)?)
            }
            MethodSpec::PayPal {
                email,
                verified,
                password_token,
                balance,
            } => {
                let mut account = PayPal::new(email, verified);
                if let Some(token) = password_token {
                    account = account.with_password_token(token);
                }
                PaymentMethod::from(account.with_balance(balance)?)
            }
            MethodSpec::Crypto {
                wallet_address,
                network,
                balance,
            } => {
                let network: CryptoNetwork = network.parse()?;
                PaymentMethod::from(Crypto::new(wallet_address, network).with_balance(balance)?)
            }
        };
        Ok(method)
    }

    /// Build and validate
    pub fn create(spec: MethodSpec) -> PaymentResult<PaymentMethod> {
        let method = Self::build(spec)?;
        method.validate()?;
        Ok(method)
    }
}
