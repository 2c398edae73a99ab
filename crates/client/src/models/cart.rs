//! Local cart state.
//!
//! The cart lives on the client and is mirrored optimistically against the
//! backend; reconciliation is best-effort and fails open to the last known
//! local state (see `NivasityClient::sync_cart`).

use serde::{Deserialize, Serialize};

use nivasity_core::{CurrencyCode, MaterialId, Price, PriceError};

use super::material::Material;

/// One material in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Material being purchased.
    pub material_id: MaterialId,
    /// Title snapshot for display without a second fetch.
    pub title: String,
    /// Unit price snapshot at the time of adding.
    pub unit_price: Price,
    /// Number of copies. Always at least 1; setting 0 removes the line.
    pub quantity: u32,
}

impl CartLine {
    /// Total for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A client-side cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct materials in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a material. Adding an already-present material increases its
    /// quantity. A zero quantity is a no-op.
    pub fn add(&mut self, material: &Material, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.material_id == material.id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.lines.push(CartLine {
            material_id: material.id,
            title: material.title.clone(),
            unit_price: material.price,
            quantity,
        });
    }

    /// Set the quantity for a material already in the cart. A quantity of
    /// zero removes the line. Unknown materials are ignored.
    pub fn set_quantity(&mut self, material_id: MaterialId, quantity: u32) {
        if quantity == 0 {
            self.remove(material_id);
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.material_id == material_id)
        {
            line.quantity = quantity;
        }
    }

    /// Remove a material from the cart.
    pub fn remove(&mut self, material_id: MaterialId) {
        self.lines.retain(|line| line.material_id != material_id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Replace the cart's contents wholesale (used when adopting the
    /// server's reconciled view).
    pub(crate) fn replace_lines(&mut self, lines: Vec<CartLine>) {
        self.lines = lines;
    }

    /// Sum of all line totals.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if lines carry different
    /// currencies.
    pub fn total(&self) -> Result<Price, PriceError> {
        let currency = self
            .lines
            .first()
            .map_or(CurrencyCode::Ngn, |line| line.unit_price.currency_code());
        self.lines
            .iter()
            .try_fold(Price::zero(currency), |total, line| {
                total.checked_add(&line.line_total())
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn material(id: i64, price_kobo: i64) -> Material {
        Material {
            id: MaterialId::new(id),
            title: format!("Material {id}"),
            description: None,
            course_code: None,
            price: Price::new(Decimal::new(price_kobo, 2), CurrencyCode::Ngn).unwrap(),
            school_id: None,
            department_id: None,
            pages: None,
            cover_url: None,
        }
    }

    #[test]
    fn test_add_merges_duplicate_materials() {
        let mut cart = Cart::new();
        let m = material(1, 100_000);
        cart.add(&m, 1);
        cart.add(&m, 2);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = Cart::new();
        cart.add(&material(1, 100_000), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(&material(1, 100_000), 2);
        cart.set_quantity(MaterialId::new(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_unknown_material_is_noop() {
        let mut cart = Cart::new();
        cart.add(&material(1, 100_000), 1);
        cart.remove(MaterialId::new(99));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_total() {
        let mut cart = Cart::new();
        cart.add(&material(1, 150_000), 2); // 2 x 1500.00
        cart.add(&material(2, 50_000), 1); // 1 x 500.00

        let total = cart.total().unwrap();
        assert_eq!(total.amount(), Decimal::new(350_000, 2));
    }

    #[test]
    fn test_total_of_empty_cart_is_zero_naira() {
        let cart = Cart::new();
        assert_eq!(cart.total().unwrap(), Price::zero(CurrencyCode::Ngn));
    }

    #[test]
    fn test_line_total() {
        let mut cart = Cart::new();
        cart.add(&material(1, 150_000), 3);
        assert_eq!(
            cart.lines()[0].line_total().amount(),
            Decimal::new(450_000, 2)
        );
    }
}
