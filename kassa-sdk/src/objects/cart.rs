//! Catalog products and the shopping cart.
//!
//! Prices stay in their display form (`"19.990 ₽"`, `"12 990 ₽"`) all the
//! way to checkout; arithmetic goes through [`parse_price_rub`], which keeps
//! digit characters only, so both dot- and space-grouped formats sum the
//! same way.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product as listed by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Formatted display price, e.g. `"19.990 ₽"`.
    pub price: String,
    /// Product image URI.
    pub image: String,
    /// Ordered spec lines shown on the product card.
    pub specs: Vec<String>,
}

/// A cart line: a product plus its quantity.
///
/// Serializes flat (product fields alongside `quantity`), matching the
/// gateway request shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Line total in whole rubles.
    pub fn line_total_rub(&self) -> Decimal {
        parse_price_rub(&self.product.price) * Decimal::from(self.quantity)
    }
}

/// Parse a formatted ruble price by keeping digit characters only.
///
/// `"19.990 ₽"` → 19990, `"12 990 ₽"` → 12990. A string without digits
/// parses to zero.
pub fn parse_price_rub(price: &str) -> Decimal {
    let digits: String = price.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(Decimal::ZERO)
}

/// The shopping cart.
///
/// Quantities are always at least one: dropping a line to zero removes it,
/// so an item with quantity zero is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Cart total in whole rubles.
    pub fn total_rub(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total_rub).sum()
    }

    /// Add one unit of `product`, merging with an existing line for the
    /// same product id.
    pub fn add(&mut self, product: Product) {
        match self.items.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => item.quantity += 1,
            None => self.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
    }

    /// Set the quantity of a line. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: i64, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.product.id == product_id) {
            item.quantity = quantity;
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.items.retain(|item| item.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
