//! # Masking
//!
//! Pure functions that turn instrument identifiers into something safe to
//! log. Domain records never mask themselves; the event sink calls these
//! at the logging boundary.

use crate::strategy::PaymentMethod;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const MASK: char = '*';
const FINGERPRINT_LEN: usize = 16;

/// `4111111111111111` → `************1111`
pub fn mask_card_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() <= 4 {
        return MASK.to_string().repeat(chars.len().max(4));
    }
    let visible = chars.len() - 4;
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < visible { MASK } else { *c })
        .collect()
}

/// `john@example.com` → `j***@example.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{}***@{}", first, domain),
            None => format!("***@{}", domain),
        },
        None => "***".to_string(),
    }
}

const WALLET_HEAD: usize = 6;
const WALLET_TAIL: usize = 4;

/// Keeps the first 6 and last 4 characters: `0x742d...f44e`.
///
/// At least as many characters must stay hidden as are shown; shorter
/// input is fully masked.
pub fn mask_wallet_address(address: &str) -> String {
    let chars: Vec<char> = address.trim().chars().collect();
    let shown = WALLET_HEAD + WALLET_TAIL;
    if chars.len() < shown * 2 {
        return "***".to_string();
    }
    let head: String = chars[..WALLET_HEAD].iter().collect();
    let tail: String = chars[chars.len() - WALLET_TAIL..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Masked identifier for whichever instrument `method` holds
pub fn masked_identifier(method: &PaymentMethod) -> String {
    match method {
        PaymentMethod::CreditCard(card) => mask_card_number(card.number().expose_secret()),
        PaymentMethod::PayPal(account) => mask_email(account.email()),
        PaymentMethod::Crypto(wallet) => mask_wallet_address(wallet.wallet_address()),
    }
}

/// Keyed HMAC-SHA256 of `value`, hex, truncated to 16 chars.
///
/// Stable for a given key, so repeated use of one card shows up as the same
/// fingerprint across log lines.
pub fn fingerprint(key: &SecretString, value: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key.expose_secret().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(value.as_bytes());
    let mut digest = hex::encode(mac.finalize().into_bytes());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

/// Fingerprint of the raw instrument identifier held by `method`
pub fn method_fingerprint(key: &SecretString, method: &PaymentMethod) -> String {
    fingerprint(key, raw_identifier(method))
}

fn raw_identifier(method: &PaymentMethod) -> &str {
    match method {
        PaymentMethod::CreditCard(card) => card.number().expose_secret(),
        PaymentMethod::PayPal(account) => account.email(),
        PaymentMethod::Crypto(wallet) => wallet.wallet_address(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::{CreditCard, Crypto, CryptoNetwork, PayPal};

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number("4111111111111111"), "************1111");
        assert_eq!(mask_card_number("123"), "****");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("john@example.com"), "j***@example.com");
        assert_eq!(mask_email("@example.com"), "***@example.com");
        assert_eq!(mask_email("no-at-sign"), "***");
    }

    #[test]
    fn test_mask_wallet_address() {
        assert_eq!(
            mask_wallet_address("0x742d35Cc6634C0532925a3b844Bc454e4438f44e"),
            "0x742d...f44e"
        );
        assert_eq!(mask_wallet_address("short"), "***");
        assert_eq!(mask_wallet_address("0x742d35Cc6"), "***");
        assert_eq!(mask_wallet_address("0x742d35Cc6634C0532"), "***");
        assert_eq!(
            mask_wallet_address("0x742d35Cc6634C05329"),
            "0x742d...5329"
        );
    }

    #[test]
    fn test_masked_identifier_per_method() {
        let card = PaymentMethod::from(CreditCard::new("4111111111111111", "12/25", "123"));
        assert_eq!(masked_identifier(&card), "************1111");

        let account = PaymentMethod::from(PayPal::new("jane@example.com", true));
        assert_eq!(masked_identifier(&account), "j***@example.com");

        let wallet = PaymentMethod::from(Crypto::new(
            "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
            CryptoNetwork::Bitcoin,
        ));
        assert_eq!(masked_identifier(&wallet), "1A1zP1...vfNa");
    }

    #[test]
    fn test_fingerprint_is_keyed_and_stable() {
        let key = SecretString::from("fingerprint-key".to_string());
        let other = SecretString::from("another-key".to_string());

        let a = fingerprint(&key, "4111111111111111");
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, fingerprint(&key, "4111111111111111"));
        assert_ne!(a, fingerprint(&other, "4111111111111111"));
        assert_ne!(a, fingerprint(&key, "4000000000000002"));
    }

    #[test]
    fn test_method_fingerprint_matches_raw_value() {
        let key = SecretString::from("k".to_string());
        let card = PaymentMethod::from(CreditCard::new("4111111111111111", "12/25", "123"));
        assert_eq!(
            method_fingerprint(&key, &card),
            fingerprint(&key, "4111111111111111")
        );
    }
}
