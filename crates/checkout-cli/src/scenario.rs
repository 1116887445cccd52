//! # Scenarios
//!
//! A scenario is a TOML file describing one customer, their wallets, an
//! order and the method to pay with:
//!
//! ```toml
//! pay_with = "credit_card"
//! currency = "usd"
//!
//! [customer]
//! name = "John Doe"
//! email = "john@example.com"
//!
//! [[catalog.items]]
//! sku = "laptop"
//! name = "Laptop"
//! unit_price = "999.99"
//!
//! [[wallets]]
//! type = "credit_card"
//! number = "4111111111111111"
//! expiry = "12/25"
//! cvv = "123"
//! balance = "2000"
//!
//! [[items]]
//! sku = "laptop"
//!
//! [[items]]
//! name = "Mouse"
//! unit_price = "29.99"
//! quantity = 2
//! ```

use anyhow::Context;
use checkout_core::{
    CheckoutOutcome, Currency, Customer, Item, ItemCatalog, MethodKind, MethodSpec, OrderId,
    PaymentError, PaymentEventSink, PaymentFactory, PaymentProcessor, PaymentResult,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Who is paying
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerSpec {
    pub name: String,
    pub email: String,
}

/// One order line: a catalog `sku`, or an inline `name` + `unit_price`
#[derive(Debug, Clone, Deserialize)]
pub struct LineSpec {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl LineSpec {
    fn resolve(&self, catalog: &ItemCatalog) -> PaymentResult<Item> {
        match (&self.sku, &self.name, self.unit_price) {
            (Some(sku), _, _) => catalog.item(sku, self.quantity),
            (None, Some(name), Some(price)) => Item::new(name.clone(), price, self.quantity),
            _ => Err(PaymentError::InvalidItem {
                reason: "line needs a sku, or a name and unit_price".to_string(),
            }),
        }
    }
}

/// A complete checkout scenario
#[derive(Clone, Deserialize)]
pub struct Scenario {
    pub customer: CustomerSpec,
    /// Falls back to the configured currency
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub catalog: ItemCatalog,
    #[serde(default)]
    pub wallets: Vec<MethodSpec>,
    #[serde(default)]
    pub items: Vec<LineSpec>,
    pub pay_with: MethodKind,
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioRun {
    pub customer: Customer,
    pub order_id: OrderId,
    pub outcome: CheckoutOutcome,
}

/// Per-wallet result of `Scenario::validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletReport {
    pub method: MethodKind,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Scenario {
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read and parse a scenario file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let scenario = Self::from_toml(&raw)
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        scenario
            .check_wallets()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }

    /// A customer holds one wallet per kind, so each kind may appear once
    pub fn check_wallets(&self) -> PaymentResult<()> {
        let mut seen = BTreeSet::new();
        for spec in &self.wallets {
            if !seen.insert(spec.kind()) {
                return Err(PaymentError::Configuration(format!(
                    "duplicate {} wallet",
                    spec.kind()
                )));
            }
        }
        Ok(())
    }

    /// Customer with every configured wallet. Credentials are checked at
    /// checkout, not here.
    pub fn build_customer(&self) -> PaymentResult<Customer> {
        self.check_wallets()?;
        let mut customer = Customer::new(self.customer.name.clone(), self.customer.email.clone());
        for spec in &self.wallets {
            customer.add_wallet(PaymentFactory::build(spec.clone())?);
        }
        Ok(customer)
    }

    pub fn resolve_items(&self) -> PaymentResult<Vec<Item>> {
        self.items
            .iter()
            .map(|line| line.resolve(&self.catalog))
            .collect()
    }

    /// Build the customer and order, then pay with `pay_with`
    pub fn run<S: PaymentEventSink>(
        &self,
        processor: &PaymentProcessor<S>,
        default_currency: Currency,
    ) -> PaymentResult<ScenarioRun> {
        let mut customer = self.build_customer()?;
        let order_id = customer.open_order(self.currency.unwrap_or(default_currency))?;
        for item in self.resolve_items()? {
            customer.add_item(&order_id, item)?;
        }

        if let Some(order) = customer.order(&order_id) {
            info!(customer = %customer.name(), "{}", order);
        }

        let outcome = processor.process(&mut customer, &order_id, self.pay_with);
        Ok(ScenarioRun {
            customer,
            order_id,
            outcome,
        })
    }

    /// Validate every wallet without paying
    pub fn validate<S: PaymentEventSink>(
        &self,
        processor: &PaymentProcessor<S>,
    ) -> PaymentResult<Vec<WalletReport>> {
        let customer = self.build_customer()?;
        Ok(processor
            .validate_wallets(&customer)
            .into_iter()
            .map(|(method, result)| WalletReport {
                method,
                valid: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{ErrorKind, RecordingSink, ValidationPolicy};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const SCENARIO: &str = r#"
        pay_with = "credit_card"

        [customer]
        name = "John Doe"
        email = "john@example.com"

        [[catalog.items]]
        sku = "laptop"
        name = "Laptop"
        unit_price = "999.99"

        [[wallets]]
        type = "credit_card"
        number = "4111111111111111"
        expiry = "12/25"
        cvv = "123"
        balance = "2000"

        [[wallets]]
        type = "paypal"
        email = "john@example.com"
        verified = false

        [[items]]
        sku = "laptop"

        [[items]]
        name = "Mouse"
        unit_price = "29.99"
        quantity = 2
    "#;

    #[test]
    fn test_run_scenario() {
        let scenario = Scenario::from_toml(SCENARIO).unwrap();
        let processor = PaymentProcessor::new(RecordingSink::new());

        let run = scenario.run(&processor, Currency::USD).unwrap();
        match &run.outcome {
            CheckoutOutcome::Paid {
                order_id, total, ..
            } => {
                assert_eq!(order_id, &run.order_id);
                assert_eq!(*total, dec!(1059.97));
            }
            other => panic!("expected paid, got {:?}", other),
        }
        assert_eq!(
            run.customer.get_balance(MethodKind::CreditCard),
            Some(dec!(940.03))
        );
    }

    #[test]
    fn test_run_with_unverified_paypal() {
        let mut scenario = Scenario::from_toml(SCENARIO).unwrap();
        scenario.pay_with = MethodKind::PayPal;
        let processor = PaymentProcessor::new(RecordingSink::new());

        let run = scenario.run(&processor, Currency::USD).unwrap();
        assert!(matches!(
            run.outcome,
            CheckoutOutcome::Failed { error_kind: ErrorKind::Validation, .. }
        ));
    }

    #[test]
    fn test_validate_reports_each_wallet() {
        let scenario = Scenario::from_toml(SCENARIO).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let processor = PaymentProcessor::new(RecordingSink::new())
            .with_policy(ValidationPolicy::rejecting_expired(today));

        let reports = scenario.validate(&processor).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].method, MethodKind::CreditCard);
        assert!(!reports[0].valid);
        assert_eq!(reports[1].method, MethodKind::PayPal);
        assert_eq!(reports[1].error.as_deref(), Some("account is not verified"));
    }

    #[test]
    fn test_duplicate_wallet_kind_rejected() {
        let duplicated = format!(
            "{}\n{}",
            SCENARIO,
            r#"
            [[wallets]]
            type = "credit_card"
            number = "4000000000000002"
            expiry = "01/30"
            cvv = "456"
            balance = "5"
            "#
        );
        let scenario = Scenario::from_toml(&duplicated).unwrap();
        assert_eq!(scenario.wallets.len(), 3);

        assert!(matches!(
            scenario.check_wallets(),
            Err(PaymentError::Configuration(_))
        ));
        assert!(matches!(
            scenario.run(&PaymentProcessor::new(RecordingSink::new()), Currency::USD),
            Err(PaymentError::Configuration(_))
        ));
        assert!(Scenario::from_toml(SCENARIO).unwrap().check_wallets().is_ok());
    }

    #[test]
    fn test_bad_lines() {
        let mut scenario = Scenario::from_toml(SCENARIO).unwrap();
        scenario.items.push(LineSpec {
            sku: None,
            name: Some("Mystery".to_string()),
            unit_price: None,
            quantity: 1,
        });
        assert!(matches!(
            scenario.resolve_items(),
            Err(PaymentError::InvalidItem { .. })
        ));

        scenario.items.truncate(2);
        scenario.items[0].sku = Some("missing".to_string());
        assert!(scenario.run(&PaymentProcessor::new(RecordingSink::new()), Currency::USD).is_err());
    }
}
