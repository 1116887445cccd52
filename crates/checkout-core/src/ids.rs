//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// User identifier (customers and admins share the id space)
    UserId
);
string_id!(
    /// Order identifier, `ORD-XXXXXXXX`
    OrderId
);
string_id!(
    /// Item identifier, `ITEM-XXXXXXXX`
    ItemId
);
string_id!(
    /// Transaction identifier, `TX-<uuid>`
    TransactionId
);

/// First 8 hex chars of a fresh v4 uuid, upper-cased
fn short_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

impl UserId {
    pub fn generate() -> Self {
        Self(format!("USR-{}", short_code()))
    }
}

impl OrderId {
    pub fn generate() -> Self {
        Self(format!("ORD-{}", short_code()))
    }
}

impl ItemId {
    pub fn generate() -> Self {
        Self(format!("ITEM-{}", short_code()))
    }
}

impl TransactionId {
    pub fn generate() -> Self {
        Self(format!("TX-{}", Uuid::new_v4()))
    }
}
