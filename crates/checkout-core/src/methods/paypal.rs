//! # PayPal
//!
//! Account-based payments. An account must have a well-formed email and be
//! verified before it can pay; a password token is optional but must be
//! strong when present.

use crate::error::{PaymentResult, ValidationError};
use crate::strategy::{Balance, MethodKind, PaymentStrategy, ValidationPolicy};
use regex::Regex;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid regex")
});

const MIN_PASSWORD_LEN: usize = 8;

/// PayPal payment method
#[derive(Debug)]
pub struct PayPal {
    email: String,
    verified: bool,
    password_token: Option<SecretString>,
    balance: Balance,
}

impl PayPal {
    pub fn new(email: impl Into<String>, verified: bool) -> Self {
        Self {
            email: email.into(),
            verified,
            password_token: None,
            balance: Balance::default(),
        }
    }

    /// Builder: attach the account's password or API token
    pub fn with_password_token(mut self, token: impl Into<String>) -> Self {
        self.password_token = Some(SecretString::from(token.into()));
        self
    }

    /// Builder: set the starting balance (must not be negative)
    pub fn with_balance(mut self, balance: Decimal) -> PaymentResult<Self> {
        self.balance = Balance::new(balance)?;
        Ok(self)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
    }

    pub fn password_token(&self) -> Option<&SecretString> {
        self.password_token.as_ref()
    }
}

impl PaymentStrategy for PayPal {
    fn kind(&self) -> MethodKind {
        MethodKind::PayPal
    }

    fn validate_with(&self, _policy: &ValidationPolicy) -> Result<(), ValidationError> {
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if let Some(token) = &self.password_token {
            if !is_strong(token.expose_secret()) {
                return Err(ValidationError::WeakPassword);
            }
        }
        if !self.verified {
            return Err(ValidationError::AccountNotVerified);
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

/// At least 8 chars, one ASCII letter and one digit
fn is_strong(token: &str) -> bool {
    token.chars().count() >= MIN_PASSWORD_LEN
        && token.chars().any(|c| c.is_ascii_alphabetic())
        && token.chars().any(|c| c.is_ascii_digit())
}
