//! # Crypto Wallet
//!
//! Address checks are format-only: a length floor per network plus the
//! network's address alphabet. Nothing is submitted to a chain.

use crate::error::{PaymentResult, ValidationError};
use crate::strategy::{Balance, MethodKind, PaymentStrategy, ValidationPolicy};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

// Legacy/P2SH base58, or bech32
static BITCOIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[13][a-km-zA-HJ-NP-Z1-9]{25,34}$|^bc1[a-z0-9]{39,59}$").expect("Invalid regex")
});

static ETHEREUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("Invalid regex"));

/// Networks with address validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoNetwork {
    Bitcoin,
    Ethereum,
}

impl CryptoNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoNetwork::Bitcoin => "bitcoin",
            CryptoNetwork::Ethereum => "ethereum",
        }
    }

    /// Shortest address accepted on this network
    pub fn min_address_len(&self) -> usize {
        match self {
            CryptoNetwork::Bitcoin => 26,
            CryptoNetwork::Ethereum => 42,
        }
    }

    fn address_pattern(&self) -> &'static Regex {
        match self {
            CryptoNetwork::Bitcoin => &BITCOIN_RE,
            CryptoNetwork::Ethereum => &ETHEREUM_RE,
        }
    }
}

impl std::fmt::Display for CryptoNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoNetwork {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bitcoin" | "btc" | "testnet" => Ok(CryptoNetwork::Bitcoin),
            "ethereum" | "eth" => Ok(CryptoNetwork::Ethereum),
            other => Err(ValidationError::UnsupportedNetwork(other.to_string())),
        }
    }
}

/// Crypto wallet payment method
#[derive(Debug, Clone)]
pub struct Crypto {
    wallet_address: String,
    network: CryptoNetwork,
    balance: Balance,
}

impl Crypto {
    pub fn new(wallet_address: impl Into<String>, network: CryptoNetwork) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            network,
            balance: Balance::default(),
        }
    }

    /// Builder: set the starting balance (must not be negative)
    pub fn with_balance(mut self, balance: Decimal) -> PaymentResult<Self> {
        self.balance = Balance::new(balance)?;
        Ok(self)
    }

    pub fn wallet_address(&self) -> &str {
        &self.wallet_address
    }

    pub fn network(&self) -> CryptoNetwork {
        self.network
    }
}

impl PaymentStrategy for Crypto {
    fn kind(&self) -> MethodKind {
        MethodKind::Crypto
    }

    fn validate_with(&self, _policy: &ValidationPolicy) -> Result<(), ValidationError> {
        let address = self.wallet_address.trim();
        if address.len() < self.network.min_address_len()
            || !self.network.address_pattern().is_match(address)
        {
            return Err(ValidationError::InvalidWalletAddress {
                network: self.network.to_string(),
            });
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
