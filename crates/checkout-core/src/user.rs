//! # Users
//!
//! Customers own their orders, wallets and transaction history. Admins
//! have no payment capability; they can only query and deactivate, gated
//! by a fixed permission level.

use crate::error::{PaymentError, PaymentResult};
use crate::events::PaymentEventSink;
use crate::history::{TransactionHistory, TransactionRecord};
use crate::ids::{OrderId, UserId};
use crate::item::Item;
use crate::money::Currency;
use crate::order::{Order, OrderState};
use crate::strategy::{MethodKind, PaymentMethod, PaymentReceipt, PaymentStrategy, ValidationPolicy};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Role, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
}

/// Identity shared by all users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl UserProfile {
    fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            role,
            created_at: Utc::now(),
            active: true,
        }
    }

    fn ensure_active(&self) -> PaymentResult<()> {
        if !self.active {
            return Err(PaymentError::InactiveUser {
                user_id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// A paying customer
#[derive(Debug)]
pub struct Customer {
    profile: UserProfile,
    wallets: BTreeMap<MethodKind, PaymentMethod>,
    orders: Vec<Order>,
    history: TransactionHistory,
}

impl Customer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            profile: UserProfile::new(name, email, Role::Customer),
            wallets: BTreeMap::new(),
            orders: Vec::new(),
            history: TransactionHistory::new(),
        }
    }

    pub fn id(&self) -> &UserId {
        &self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn email(&self) -> &str {
        &self.profile.email
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_active(&self) -> bool {
        self.profile.active
    }

    /// Soft delete; the customer can no longer open orders or pay
    pub fn deactivate(&mut self) {
        self.profile.active = false;
        info!(user_id = %self.profile.id, "Customer deactivated");
    }

    /// Store a wallet, replacing (and returning) any wallet of the same kind
    pub fn add_wallet(&mut self, method: impl Into<PaymentMethod>) -> Option<PaymentMethod> {
        let method = method.into();
        self.wallets.insert(method.kind(), method)
    }

    pub fn wallet(&self, kind: MethodKind) -> Option<&PaymentMethod> {
        self.wallets.get(&kind)
    }

    /// Configured wallets, ordered by kind
    pub fn wallets(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.wallets.values()
    }

    pub fn get_balance(&self, kind: MethodKind) -> Option<Decimal> {
        self.wallets.get(&kind).map(PaymentStrategy::balance)
    }

    /// Sum of all wallet balances, `None` if it overflows
    pub fn total_balance(&self) -> Option<Decimal> {
        self.wallets
            .values()
            .try_fold(Decimal::ZERO, |acc, w| acc.checked_add(w.balance()))
    }

    /// Top up one wallet
    pub fn deposit(&mut self, kind: MethodKind, amount: Decimal) -> PaymentResult<Decimal> {
        self.wallets
            .get_mut(&kind)
            .ok_or(PaymentError::WalletNotFound { method: kind })?
            .deposit(amount)
    }

    /// Open a new order owned by this customer
    pub fn open_order(&mut self, currency: Currency) -> PaymentResult<OrderId> {
        self.profile.ensure_active()?;
        let order = Order::new(self, currency);
        let id = order.id().clone();
        info!(user_id = %self.profile.id, order_id = %id, "Order opened");
        self.orders.push(order);
        Ok(id)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == order_id)
    }

    pub fn order_mut(&mut self, order_id: &OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|order| order.id() == order_id)
    }

    /// Add an item to one of this customer's orders
    pub fn add_item(&mut self, order_id: &OrderId, item: Item) -> PaymentResult<()> {
        self.order_mut(order_id)
            .ok_or_else(|| PaymentError::OrderNotFound {
                order_id: order_id.clone(),
            })?
            .add_item(item)
    }

    /// Pay one of this customer's orders with the wallet of `kind`
    pub fn checkout(
        &mut self,
        order_id: &OrderId,
        kind: MethodKind,
        sink: &dyn PaymentEventSink,
        policy: &ValidationPolicy,
    ) -> PaymentResult<PaymentReceipt> {
        self.profile.ensure_active()?;

        let Customer {
            profile,
            wallets,
            orders,
            history,
        } = self;

        let order = orders
            .iter_mut()
            .find(|order| order.id() == order_id)
            .ok_or_else(|| PaymentError::OrderNotFound {
                order_id: order_id.clone(),
            })?;
        Self::pay_with(profile, wallets, history, order, kind, sink, policy)
    }

    /// Pay an order held outside this customer (built with `Order::new`)
    pub fn pay(
        &mut self,
        order: &mut Order,
        kind: MethodKind,
        sink: &dyn PaymentEventSink,
        policy: &ValidationPolicy,
    ) -> PaymentResult<PaymentReceipt> {
        self.profile.ensure_active()?;
        let Customer {
            profile,
            wallets,
            history,
            ..
        } = self;
        Self::pay_with(profile, wallets, history, order, kind, sink, policy)
    }

    fn pay_with(
        profile: &UserProfile,
        wallets: &mut BTreeMap<MethodKind, PaymentMethod>,
        history: &mut TransactionHistory,
        order: &mut Order,
        kind: MethodKind,
        sink: &dyn PaymentEventSink,
        policy: &ValidationPolicy,
    ) -> PaymentResult<PaymentReceipt> {
        if order.customer_id() != &profile.id {
            return Err(PaymentError::CustomerMismatch {
                order_id: order.id().clone(),
                customer_id: profile.id.clone(),
            });
        }
        let method = wallets
            .get_mut(&kind)
            .ok_or(PaymentError::WalletNotFound { method: kind })?;
        order.checkout(method, history, sink, policy)
    }

    /// Replace a failed order with a fresh open copy, returning its id.
    ///
    /// An open order is returned as is; a paid order cannot be retried.
    pub fn retry_order(&mut self, order_id: &OrderId) -> PaymentResult<OrderId> {
        self.profile.ensure_active()?;
        let order = self.order(order_id).ok_or_else(|| PaymentError::OrderNotFound {
            order_id: order_id.clone(),
        })?;

        match order.state() {
            OrderState::Open => Ok(order_id.clone()),
            OrderState::Paid => Err(PaymentError::OrderClosed {
                order_id: order_id.clone(),
                state: OrderState::Paid,
            }),
            OrderState::Failed => {
                let retry = order.retry_as_new().ok_or_else(|| PaymentError::OrderClosed {
                    order_id: order_id.clone(),
                    state: OrderState::Failed,
                })?;
                let id = retry.id().clone();
                info!(order_id = %order_id, retry_id = %id, "Order retried");
                self.orders.push(retry);
                Ok(id)
            }
        }
    }

    /// Completed payments, oldest first
    pub fn view_transaction_history(&self) -> &[TransactionRecord] {
        self.history.entries()
    }

    pub fn history(&self) -> &TransactionHistory {
        &self.history
    }
}

/// How much an admin may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Viewer,
    Operator,
    Superuser,
}

/// Administrative actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ViewTransactions,
    ViewOrders,
    DeactivateUsers,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewTransactions => "view_transactions",
            Permission::ViewOrders => "view_orders",
            Permission::DeactivateUsers => "deactivate_users",
        }
    }

    /// Lowest level that grants this permission
    fn required_level(&self) -> PermissionLevel {
        match self {
            Permission::ViewTransactions => PermissionLevel::Viewer,
            Permission::ViewOrders => PermissionLevel::Operator,
            Permission::DeactivateUsers => PermissionLevel::Superuser,
        }
    }
}

/// Administrator
#[derive(Debug, Clone)]
pub struct Admin {
    profile: UserProfile,
    permission_level: PermissionLevel,
}

impl Admin {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        permission_level: PermissionLevel,
    ) -> Self {
        Self {
            profile: UserProfile::new(name, email, Role::Admin),
            permission_level,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.profile.id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn permission_level(&self) -> PermissionLevel {
        self.permission_level
    }

    pub fn deactivate(&mut self) {
        self.profile.active = false;
    }

    /// An inactive admin has no permissions
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.profile.active && self.permission_level >= permission.required_level()
    }

    fn require(&self, permission: Permission) -> PaymentResult<()> {
        self.profile.ensure_active()?;
        if !self.has_permission(permission) {
            return Err(PaymentError::PermissionDenied {
                action: permission.as_str().to_string(),
            });
        }
        Ok(())
    }

    pub fn review_transactions<'a>(
        &self,
        customer: &'a Customer,
    ) -> PaymentResult<&'a [TransactionRecord]> {
        self.require(Permission::ViewTransactions)?;
        Ok(customer.view_transaction_history())
    }

    pub fn review_orders<'a>(&self, customer: &'a Customer) -> PaymentResult<&'a [Order]> {
        self.require(Permission::ViewOrders)?;
        Ok(customer.orders())
    }

    pub fn deactivate_customer(&self, customer: &mut Customer) -> PaymentResult<()> {
        self.require(Permission::DeactivateUsers)?;
        info!(admin_id = %self.profile.id, user_id = %customer.id(), "Deactivating customer");
        customer.deactivate();
        Ok(())
    }
}

/// Any user
#[derive(Debug)]
pub enum User {
    Customer(Customer),
    Admin(Admin),
}

impl User {
    pub fn profile(&self) -> &UserProfile {
        match self {
            User::Customer(customer) => customer.profile(),
            User::Admin(admin) => admin.profile(),
        }
    }

    pub fn role(&self) -> Role {
        self.profile().role
    }

    pub fn is_active(&self) -> bool {
        self.profile().active
    }

    pub fn deactivate(&mut self) {
        match self {
            User::Customer(customer) => customer.deactivate(),
            User::Admin(admin) => admin.deactivate(),
        }
    }
}

impl From<Customer> for User {
    fn from(customer: Customer) -> Self {
        User::Customer(customer)
    }
}

impl From<Admin> for User {
    fn from(admin: Admin) -> Self {
        User::Admin(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::methods::{CreditCard, Crypto, CryptoNetwork, PayPal};
    use rust_decimal_macros::dec;

    fn customer_with_card(balance: Decimal) -> Customer {
        let mut customer = Customer::new("John Doe", "john@example.com");
        customer.add_wallet(
            CreditCard::new("4111111111111111", "12/25", "123")
                .with_balance(balance)
                .unwrap(),
        );
        customer
    }

    #[test]
    fn test_wallets() {
        let mut customer = customer_with_card(dec!(100));
        customer.add_wallet(
            PayPal::new("john@example.com", true)
                .with_balance(dec!(25))
                .unwrap(),
        );

        assert_eq!(customer.get_balance(MethodKind::CreditCard), Some(dec!(100)));
        assert_eq!(customer.get_balance(MethodKind::Crypto), None);
        assert_eq!(customer.total_balance(), Some(dec!(125)));

        let replaced = customer.add_wallet(
            CreditCard::new("4000000000000002", "01/30", "456")
                .with_balance(dec!(5))
                .unwrap(),
        );
        assert!(replaced.is_some());
        assert_eq!(customer.get_balance(MethodKind::CreditCard), Some(dec!(5)));

        customer.deposit(MethodKind::PayPal, dec!(10)).unwrap();
        assert_eq!(customer.get_balance(MethodKind::PayPal), Some(dec!(35)));

        assert!(matches!(
            customer.deposit(MethodKind::Crypto, dec!(1)),
            Err(PaymentError::WalletNotFound { .. })
        ));
        customer.add_wallet(
            Crypto::new("0x742d35Cc6634C0532925a3b844Bc454e4438f44e", CryptoNetwork::Ethereum)
                .with_balance(Decimal::MAX)
                .unwrap(),
        );
        assert_eq!(customer.total_balance(), None);
        assert!(matches!(
            customer.deposit(MethodKind::Crypto, dec!(1)),
            Err(PaymentError::InvalidAmount { .. })
        ));
        assert_eq!(customer.get_balance(MethodKind::Crypto), Some(Decimal::MAX));
    }

    #[test]
    fn test_checkout_owned_order() {
        let mut customer = customer_with_card(dec!(100));
        let order_id = customer.open_order(Currency::USD).unwrap();
        customer
            .add_item(&order_id, Item::new("Book", dec!(12.50), 2).unwrap())
            .unwrap();

        let sink = RecordingSink::new();
        customer
            .checkout(&order_id, MethodKind::CreditCard, &sink, &ValidationPolicy::lenient())
            .unwrap();

        assert_eq!(customer.get_balance(MethodKind::CreditCard), Some(dec!(75)));
        assert_eq!(customer.order(&order_id).unwrap().state(), OrderState::Paid);
        assert_eq!(customer.view_transaction_history().len(), 1);
    }

    #[test]
    fn test_checkout_preconditions() {
        let mut customer = customer_with_card(dec!(100));
        let sink = RecordingSink::new();
        let policy = ValidationPolicy::lenient();

        let missing = OrderId::from("ORD-MISSING");
        assert!(matches!(
            customer.checkout(&missing, MethodKind::CreditCard, &sink, &policy),
            Err(PaymentError::OrderNotFound { .. })
        ));

        let order_id = customer.open_order(Currency::USD).unwrap();
        customer
            .add_item(&order_id, Item::new("Pen", dec!(1), 1).unwrap())
            .unwrap();
        assert!(matches!(
            customer.checkout(&order_id, MethodKind::PayPal, &sink, &policy),
            Err(PaymentError::WalletNotFound { method: MethodKind::PayPal })
        ));
        assert!(customer.order(&order_id).unwrap().is_open());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_customer_mismatch() {
        let mut alice = customer_with_card(dec!(100));
        let bob = Customer::new("Bob", "bob@example.com");

        let mut order = Order::new(&bob, Currency::USD);
        order.add_item(Item::new("Pen", dec!(1), 1).unwrap()).unwrap();

        let err = alice
            .pay(
                &mut order,
                MethodKind::CreditCard,
                &RecordingSink::new(),
                &ValidationPolicy::lenient(),
            )
            .unwrap_err();
        assert!(matches!(err, PaymentError::CustomerMismatch { .. }));
        assert!(order.is_open());
        assert_eq!(alice.get_balance(MethodKind::CreditCard), Some(dec!(100)));
    }

    #[test]
    fn test_inactive_customer() {
        let mut customer = customer_with_card(dec!(100));
        let order_id = customer.open_order(Currency::USD).unwrap();
        customer.deactivate();

        assert!(matches!(
            customer.open_order(Currency::USD),
            Err(PaymentError::InactiveUser { .. })
        ));
        assert!(matches!(
            customer.checkout(
                &order_id,
                MethodKind::CreditCard,
                &RecordingSink::new(),
                &ValidationPolicy::lenient()
            ),
            Err(PaymentError::InactiveUser { .. })
        ));
    }

    #[test]
    fn test_retry_failed_order() {
        let mut customer = customer_with_card(dec!(10));
        let order_id = customer.open_order(Currency::USD).unwrap();
        customer
            .add_item(&order_id, Item::new("Lamp", dec!(20), 1).unwrap())
            .unwrap();
        let sink = RecordingSink::new();
        let policy = ValidationPolicy::lenient();

        assert!(customer
            .checkout(&order_id, MethodKind::CreditCard, &sink, &policy)
            .is_err());

        customer.deposit(MethodKind::CreditCard, dec!(10)).unwrap();
        let retry_id = customer.retry_order(&order_id).unwrap();
        assert_ne!(retry_id, order_id);
        customer
            .checkout(&retry_id, MethodKind::CreditCard, &sink, &policy)
            .unwrap();

        assert_eq!(customer.orders().len(), 2);
        assert!(matches!(
            customer.retry_order(&retry_id),
            Err(PaymentError::OrderClosed { state: OrderState::Paid, .. })
        ));
    }

    #[test]
    fn test_admin_permissions() {
        let mut customer = customer_with_card(dec!(100));
        let viewer = Admin::new("Vera", "vera@example.com", PermissionLevel::Viewer);
        let operator = Admin::new("Otto", "otto@example.com", PermissionLevel::Operator);
        let root = Admin::new("Root", "root@example.com", PermissionLevel::Superuser);

        assert!(viewer.review_transactions(&customer).unwrap().is_empty());
        assert!(matches!(
            viewer.review_orders(&customer),
            Err(PaymentError::PermissionDenied { .. })
        ));
        assert!(operator.review_orders(&customer).is_ok());
        assert!(matches!(
            operator.deactivate_customer(&mut customer),
            Err(PaymentError::PermissionDenied { .. })
        ));
        assert!(customer.is_active());

        root.deactivate_customer(&mut customer).unwrap();
        assert!(!customer.is_active());
    }

    #[test]
    fn test_inactive_admin() {
        let customer = customer_with_card(dec!(1));
        let mut admin = Admin::new("Root", "root@example.com", PermissionLevel::Superuser);
        admin.deactivate();

        assert!(!admin.has_permission(Permission::ViewTransactions));
        assert!(matches!(
            admin.review_transactions(&customer),
            Err(PaymentError::InactiveUser { .. })
        ));
    }

    #[test]
    fn test_user_roles() {
        let mut user = User::from(Admin::new("A", "a@example.com", PermissionLevel::Viewer));
        assert_eq!(user.role(), Role::Admin);
        user.deactivate();
        assert!(!user.is_active());

        let user = User::from(Customer::new("C", "c@example.com"));
        assert_eq!(user.role(), Role::Customer);
    }
}
