//! # Credit Card
//!
//! Card number and CVV are held as `SecretString` so a stray `{:?}` never
//! prints them; masking for logs happens in `crate::masking`.

use crate::error::{PaymentResult, ValidationError};
use crate::strategy::{Balance, MethodKind, PaymentStrategy, ValidationPolicy};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use std::sync::LazyLock;

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})[/-](\d{2})$").expect("Invalid regex"));

/// Credit card payment method
#[derive(Debug)]
pub struct CreditCard {
    number: SecretString,
    expiry: String,
    cvv: SecretString,
    holder: Option<String>,
    balance: Balance,
}

impl CreditCard {
    /// Create a card with a zero balance. Nothing is checked until `validate()`.
    pub fn new(
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            number: SecretString::from(number.into()),
            expiry: expiry.into(),
            cvv: SecretString::from(cvv.into()),
            holder: None,
            balance: Balance::default(),
        }
    }

    /// Builder: set the holder name as printed on the card, in the form
    /// "Prefix Firstname Lastname" (e.g., "Mr John Doe")
    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    /// Builder: set the starting balance (must not be negative)
    pub fn with_balance(mut self, balance: Decimal) -> PaymentResult<Self> {
        self.balance = Balance::new(balance)?;
        Ok(self)
    }

    pub fn number(&self) -> &SecretString {
        &self.number
    }

    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    /// Parsed expiry as (month, four-digit year), if well-formed
    pub fn expiry_month(&self) -> Option<(u32, i32)> {
        parse_expiry(&self.expiry)
    }

    /// Cards are valid through the end of their expiry month
    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        match self.expiry_month() {
            Some((month, year)) => (date.year(), date.month()) > (year, month),
            None => false,
        }
    }
}

impl PaymentStrategy for CreditCard {
    fn kind(&self) -> MethodKind {
        MethodKind::CreditCard
    }

    fn validate_with(&self, policy: &ValidationPolicy) -> Result<(), ValidationError> {
        if let Some(holder) = &self.holder {
            if !is_valid_holder(holder) {
                return Err(ValidationError::InvalidCardHolder {
                    value: holder.clone(),
                });
            }
        }

        let number = self.number.expose_secret();
        if number.len() != 16 || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidCardNumber);
        }

        if self.expiry_month().is_none() {
            return Err(ValidationError::InvalidExpiry {
                value: self.expiry.clone(),
            });
        }
        if let Some(today) = policy.expiry_reference {
            if self.is_expired_on(today) {
                return Err(ValidationError::ExpiredCard {
                    value: self.expiry.clone(),
                });
            }
        }

        let cvv = self.cvv.expose_secret();
        if !(3..=4).contains(&cvv.len()) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidCvv);
        }

        Ok(())
    }

    fn balance_ref(&self) -> &Balance {
        &self.balance
    }

    fn balance_mut(&mut self) -> &mut Balance {
        &mut self.balance
    }
}

/// Exactly three non-empty parts separated by single spaces
fn is_valid_holder(value: &str) -> bool {
    let parts: Vec<&str> = value.split(' ').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
}

/// `MM/YY` or `MM-YY` → (month, 2000 + YY)
fn parse_expiry(value: &str) -> Option<(u32, i32)> {
    let caps = EXPIRY_RE.captures(value.trim())?;
    let month: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((month, 2000 + year))
}
