//! Local cart commands.
//!
//! The cart lives in a JSON file next to the session so it survives between
//! invocations; `sync` and `checkout` mirror it against the backend.

use std::path::PathBuf;

use tracing::info;

use nivasity_core::MaterialId;

use nivasity_client::Cart;

use super::build_client;

const DEFAULT_CART_FILE: &str = ".nivasity/cart.json";

fn cart_path() -> PathBuf {
    std::env::var("NIVASITY_CART_FILE")
        .unwrap_or_else(|_| DEFAULT_CART_FILE.to_string())
        .into()
}

fn load_cart() -> Result<Cart, Box<dyn std::error::Error>> {
    let path = cart_path();
    if !path.exists() {
        return Ok(Cart::new());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn save_cart(cart: &Cart) -> Result<(), Box<dyn std::error::Error>> {
    let path = cart_path();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(cart)?)?;
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty.");
        return;
    }
    for line in cart.lines() {
        println!(
            "{:>6}  {:<40} x{:<3} {}",
            line.material_id,
            line.title,
            line.quantity,
            line.line_total()
        );
    }
    match cart.total() {
        Ok(total) => println!("Total: {total}"),
        Err(e) => println!("Total: unavailable ({e})"),
    }
}

/// Add a material to the cart, snapshotting its current price.
pub async fn add(id: MaterialId, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let material = client.material(id).await?;

    let mut cart = load_cart()?;
    cart.add(&material, quantity);
    save_cart(&cart)?;

    println!("Added {} x{quantity}", material.title);
    print_cart(&cart);
    Ok(())
}

/// Remove a material from the cart.
pub fn remove(id: MaterialId) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = load_cart()?;
    cart.remove(id);
    save_cart(&cart)?;
    print_cart(&cart);
    Ok(())
}

/// Show the cart.
pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    print_cart(&load_cart()?);
    Ok(())
}

/// Empty the cart.
pub fn clear() -> Result<(), Box<dyn std::error::Error>> {
    save_cart(&Cart::new())?;
    println!("Cart cleared.");
    Ok(())
}

/// Push the cart to the backend and adopt the reconciled copy. Best-effort:
/// a dead network keeps the local cart untouched.
pub async fn sync() -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let cart = load_cart()?;

    let reconciled = client.sync_cart(&cart).await;
    save_cart(&reconciled)?;

    info!("Cart synced");
    print_cart(&reconciled);
    Ok(())
}

/// Open a hosted checkout session for the cart.
pub async fn checkout() -> Result<(), Box<dyn std::error::Error>> {
    let cart = load_cart()?;
    if cart.is_empty() {
        println!("Cart is empty - nothing to check out.");
        return Ok(());
    }

    let client = build_client()?;
    let session = client.initialize_payment(&cart).await?;

    println!("Open this URL to pay:");
    println!("  {}", session.checkout_url);
    println!("Afterwards, confirm with: nv-cli orders verify {}", session.reference);
    Ok(())
}
