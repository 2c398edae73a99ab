//! Order history and payment verification commands.

use nivasity_core::OrderId;

use super::build_client;

/// List the signed-in student's orders.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let orders = client.orders().await?;

    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }

    for order in &orders {
        println!(
            "{:>6}  {:<20} {:<12} {:<10} {}",
            order.id,
            order.reference,
            order.status,
            format!("{:?}", order.payment_status).to_lowercase(),
            order.total
        );
    }
    Ok(())
}

/// Show one order with its line items.
pub async fn show(id: OrderId) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let order = client.order(id).await?;

    println!(
        "Order {} ({}) - {} - {}",
        order.id, order.reference, order.status, order.total
    );
    println!("Placed: {}", order.created_at.to_rfc3339());
    for item in &order.items {
        println!(
            "  {:<40} x{:<3} {}",
            item.title,
            item.quantity,
            item.unit_price.times(item.quantity)
        );
    }
    Ok(())
}

/// Look up a payment by its gateway reference.
pub async fn verify(reference: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let order = client.verify_payment(reference).await?;

    println!(
        "Payment {}: order {} is {} ({:?})",
        reference,
        order.id,
        order.status,
        order.payment_status
    );
    Ok(())
}
