//! Scripted walkthrough of the checkout engine.

use checkout_core::{
    Admin, CheckoutOutcome, CreditCard, Crypto, CryptoNetwork, Currency, Customer, Item,
    MethodKind, PayPal, PaymentEventSink, PaymentProcessor, PermissionLevel,
};
use rust_decimal_macros::dec;
use tracing::{info, warn};

/// Run every step: success, insufficient funds and retry, validation
/// error, closed order, admin review
pub fn run<S: PaymentEventSink>(
    processor: &PaymentProcessor<S>,
    currency: Currency,
) -> anyhow::Result<Vec<CheckoutOutcome>> {
    let mut outcomes = Vec::new();

    let mut customer = Customer::new("John Doe", "john@example.com");
    customer.add_wallet(CreditCard::new("4111111111111111", "12/25", "123").with_balance(dec!(1000))?);
    customer.add_wallet(PayPal::new("john@example.com", false).with_balance(dec!(500))?);
    customer.add_wallet(
        Crypto::new("0x742d35Cc6634C0532925a3b844Bc454e4438f44e", CryptoNetwork::Ethereum)
            .with_balance(dec!(50))?,
    );
    info!(customer = %customer.name(), total_balance = ?customer.total_balance(), "Customer ready");

    // 1. Card short by 59.97
    println!("\n── Step 1: insufficient funds ──");
    let order_id = customer.open_order(currency)?;
    customer.add_item(&order_id, Item::new("Laptop", dec!(999.99), 1)?)?;
    customer.add_item(&order_id, Item::new("Mouse", dec!(29.99), 2)?)?;
    if let Some(order) = customer.order(&order_id) {
        println!("{}", order);
    }
    let outcome = processor.process(&mut customer, &order_id, MethodKind::CreditCard);
    print_outcome(&outcome);
    outcomes.push(outcome);

    // 2. Top up and retry as a new order
    println!("\n── Step 2: deposit and retry ──");
    customer.deposit(MethodKind::CreditCard, dec!(1000))?;
    let retry_id = customer.retry_order(&order_id)?;
    let outcome = processor.process(&mut customer, &retry_id, MethodKind::CreditCard);
    print_outcome(&outcome);
    outcomes.push(outcome);
    if let Some(balance) = customer.get_balance(MethodKind::CreditCard) {
        println!("Card balance: {}", currency.format(balance));
    }

    // 3. Unverified PayPal account
    println!("\n── Step 3: validation error ──");
    let order_id = customer.open_order(currency)?;
    customer.add_item(&order_id, Item::new("Headphones", dec!(89.50), 1)?)?;
    let outcome = processor.process(&mut customer, &order_id, MethodKind::PayPal);
    print_outcome(&outcome);
    outcomes.push(outcome);

    // 4. A paid order no longer accepts items
    println!("\n── Step 4: closed order ──");
    match customer.add_item(&retry_id, Item::new("Cable", dec!(9.99), 1)?) {
        Ok(()) => warn!(order_id = %retry_id, "Paid order accepted a new item"),
        Err(e) => println!("Rejected: {}", e),
    }

    // 5. Admin review
    println!("\n── Step 5: admin review ──");
    let admin = Admin::new("Ada Admin", "ada@example.com", PermissionLevel::Viewer);
    for record in admin.review_transactions(&customer)? {
        println!(
            "{}  {}  {}  {}  {:?}",
            record.transaction_id,
            record.order_id,
            record.method,
            record.currency.format(record.amount),
            record.status
        );
    }
    if let Err(e) = admin.deactivate_customer(&mut customer) {
        println!("Viewer cannot deactivate: {}", e);
    }

    Ok(outcomes)
}

fn print_outcome(outcome: &CheckoutOutcome) {
    match outcome {
        CheckoutOutcome::Paid {
            order_id,
            total,
            transaction_id,
        } => println!("✓ {} paid {} ({})", order_id, total, transaction_id),
        CheckoutOutcome::Failed {
            order_id,
            error_kind,
            message,
        } => println!("✗ {} failed [{}]: {}", order_id, error_kind, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{ErrorKind, RecordingSink};

    #[test]
    fn test_demo_outcomes() {
        let processor = PaymentProcessor::new(RecordingSink::new());
        let outcomes = run(&processor, Currency::USD).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(
            outcomes[0],
            CheckoutOutcome::Failed { error_kind: ErrorKind::InsufficientFunds, .. }
        ));
        assert!(outcomes[1].is_paid());
        assert!(matches!(
            outcomes[2],
            CheckoutOutcome::Failed { error_kind: ErrorKind::Validation, .. }
        ));
    }
}
