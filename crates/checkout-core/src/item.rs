//! # Item Types
//!
//! Order lines and the optional item catalog.
//! Catalog entries can be loaded from a TOML file (`[[items]]` tables).

use crate::error::{PaymentError, PaymentResult};
use crate::ids::ItemId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A priced line in an order. Immutable once constructed.
///
/// Deserialization goes through `Item::new`, so a decoded item obeys the
/// same rules as a constructed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord")]
pub struct Item {
    id: ItemId,
    name: String,
    unit_price: Decimal,
    quantity: u32,
}

impl Item {
    /// Create an item, rejecting a negative price, zero quantity, blank name
    /// or a subtotal too large to represent
    pub fn new(name: impl Into<String>, unit_price: Decimal, quantity: u32) -> PaymentResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PaymentError::InvalidItem {
                reason: "name must not be empty".to_string(),
            });
        }
        if unit_price < Decimal::ZERO {
            return Err(PaymentError::InvalidItem {
                reason: format!("unit price must not be negative (got {})", unit_price),
            });
        }
        if quantity == 0 {
            return Err(PaymentError::InvalidItem {
                reason: "quantity must be at least 1".to_string(),
            });
        }
        if unit_price.checked_mul(Decimal::from(quantity)).is_none() {
            return Err(PaymentError::InvalidItem {
                reason: format!("subtotal of {} x {} overflows", unit_price, quantity),
            });
        }

        Ok(Self {
            id: ItemId::generate(),
            name,
            unit_price,
            quantity,
        })
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price × quantity (checked representable in `new`)
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Wire shape of an `Item`, validated on the way in
#[derive(Deserialize)]
struct ItemRecord {
    id: ItemId,
    name: String,
    unit_price: Decimal,
    quantity: u32,
}

impl TryFrom<ItemRecord> for Item {
    type Error = PaymentError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let mut item = Item::new(record.name, record.unit_price, record.quantity)?;
        item.id = record.id;
        Ok(item)
    }
}

/// A catalog entry (loaded from config)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Lookup key used by scenarios (e.g., "macbook-pro")
    pub sku: String,

    /// Display name
    pub name: String,

    /// Unit price in the order currency
    pub unit_price: Decimal,

    /// Whether this entry can be ordered
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Item catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    #[serde(default)]
    pub items: Vec<CatalogEntry>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add(&mut self, entry: CatalogEntry) {
        self.items.push(entry);
    }

    /// Find an active entry by sku
    pub fn get(&self, sku: &str) -> Option<&CatalogEntry> {
        self.items.iter().find(|e| e.sku == sku && e.active)
    }

    /// Build an order line for `quantity` units of `sku`
    pub fn item(&self, sku: &str, quantity: u32) -> PaymentResult<Item> {
        let entry = self.get(sku).ok_or_else(|| PaymentError::InvalidItem {
            reason: format!("unknown or inactive catalog entry: {}", sku),
        })?;
        Item::new(entry.name.clone(), entry.unit_price, quantity)
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
