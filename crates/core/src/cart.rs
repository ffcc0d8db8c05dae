//! The in-memory shopping cart and its mutations.
//!
//! [`CartState`] is the authoritative working copy of the cart. All mutations
//! are synchronous, reducer-style operations: they either succeed and leave
//! the state consistent, or fail and leave it untouched. The derived
//! `item_count` is maintained incrementally by every mutation so badge
//! rendering stays O(1); only [`CartState::replace_all`] recomputes it from
//! scratch, so the incremental and authoritative paths can never drift apart
//! after a bulk remote sync.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Errors from cart mutations.
///
/// These are contract violations from the calling UI, not runtime faults:
/// the failed mutation is aborted and prior cart state is left intact.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A mutation was given a zero quantity where a positive one is required.
    #[error("Invalid quantity: expected a positive quantity")]
    InvalidQuantity,

    /// A mutation referenced a line item that is not in the cart
    /// (typically stale UI state pointing at a removed line).
    #[error("Item not found in cart: {0}")]
    ItemNotFound(ProductId),
}

/// A single product line in the cart.
///
/// Line items are owned exclusively by the cart state and copied on the way
/// in and out; nothing outside the cart holds a mutable reference to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product this line refers to (unique key within the cart).
    pub id: ProductId,
    /// Product title, as shown in the cart screen.
    pub title: String,
    /// Unit price in the currency's standard unit (e.g., dollars).
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
    /// Number of units of this product. Always >= 1 while in the cart.
    pub quantity: u32,
}

impl CartItem {
    /// Price of the whole line (`price * quantity`).
    #[must_use]
    pub fn line_price(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The current cart: line items plus a derived total item count.
///
/// Invariant: `item_count == sum of all line quantities` after every
/// mutation. Line items are unique by product ID; their order is not
/// meaningful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<CartItem>,
    item_count: u32,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            item_count: 0,
        }
    }

    /// The current line items.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Total number of units across all lines (the tab badge count).
    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Whether the cart has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_price).sum()
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// If a line with the same product ID already exists its quantity is
    /// incremented; otherwise a new line is appended. The `quantity` field
    /// of the passed `item` is ignored in favor of the explicit argument.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero.
    pub fn add_item(&mut self, item: CartItem, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            existing.quantity += quantity;
        } else {
            self.items.push(CartItem { quantity, ..item });
        }
        self.item_count += quantity;
        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// A no-op (not an error) when no line has the given product ID.
    pub fn remove_item(&mut self, id: ProductId) {
        if let Some(index) = self.items.iter().position(|line| line.id == id) {
            let removed = self.items.swap_remove(index);
            self.item_count -= removed.quantity;
        }
    }

    /// Set the quantity of an existing line.
    ///
    /// A `new_quantity` of zero is equivalent to [`Self::remove_item`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if `new_quantity` is positive and
    /// no line has the given product ID.
    pub fn set_quantity(&mut self, id: ProductId, new_quantity: u32) -> Result<(), CartError> {
        if new_quantity == 0 {
            self.remove_item(id);
            return Ok(());
        }

        let line = self
            .items
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(CartError::ItemNotFound(id))?;

        self.item_count = self.item_count - line.quantity + new_quantity;
        line.quantity = new_quantity;
        Ok(())
    }

    /// Replace the whole cart, recomputing `item_count` from scratch.
    ///
    /// Used when the remote cart is pulled as ground truth; this is the only
    /// operation that may grow or shrink the item set by more than one line.
    pub fn replace_all(&mut self, items: Vec<CartItem>) {
        self.item_count = items.iter().map(|line| line.quantity).sum();
        self.items = items;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: i64, price: &str) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: price.parse::<Decimal>().unwrap(),
            image: format!("https://img.example/{id}.jpg"),
            quantity: 1,
        }
    }

    fn count_invariant_holds(cart: &CartState) -> bool {
        cart.item_count() == cart.items().iter().map(|line| line.quantity).sum::<u32>()
    }

    #[test]
    fn test_add_item_merges_by_id() {
        let mut cart = CartState::new();
        cart.add_item(item(7, "10.00"), 2).unwrap();
        cart.add_item(item(7, "10.00"), 3).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_add_item_zero_quantity_rejected() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "5.00"), 2).unwrap();
        let before = cart.clone();

        assert_eq!(cart.add_item(item(2, "5.00"), 0), Err(CartError::InvalidQuantity));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_item_subtracts_quantity() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "5.00"), 2).unwrap();
        cart.add_item(item(2, "3.00"), 4).unwrap();

        cart.remove_item(ProductId::new(1));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_remove_missing_item_is_noop() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "5.00"), 2).unwrap();
        let before = cart.clone();

        cart.remove_item(ProductId::new(99));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_adjusts_count_by_delta() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "5.00"), 2).unwrap();
        cart.add_item(item(2, "3.00"), 1).unwrap();

        cart.set_quantity(ProductId::new(1), 5).unwrap();
        assert_eq!(cart.item_count(), 6);

        cart.set_quantity(ProductId::new(1), 1).unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let mut removed = CartState::new();
        removed.add_item(item(7, "5.00"), 3).unwrap();
        removed.add_item(item(8, "2.00"), 1).unwrap();
        let mut zeroed = removed.clone();

        removed.remove_item(ProductId::new(7));
        zeroed.set_quantity(ProductId::new(7), 0).unwrap();

        assert_eq!(removed, zeroed);
    }

    #[test]
    fn test_set_quantity_missing_item_fails() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "5.00"), 2).unwrap();
        let before = cart.clone();

        assert_eq!(
            cart.set_quantity(ProductId::new(42), 3),
            Err(CartError::ItemNotFound(ProductId::new(42)))
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_replace_all_recomputes_count() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "5.00"), 2).unwrap();

        let mut two = item(2, "3.00");
        two.quantity = 4;
        let mut three = item(3, "1.00");
        three.quantity = 1;
        cart.replace_all(vec![two, three]);

        assert_eq!(cart.item_count(), 5);
        assert!(count_invariant_holds(&cart));
    }

    #[test]
    fn test_replace_all_empty_resets_count() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "5.00"), 7).unwrap();

        cart.replace_all(Vec::new());
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_count_invariant_across_mutation_sequence() {
        let mut cart = CartState::new();

        cart.add_item(item(1, "5.00"), 2).unwrap();
        assert!(count_invariant_holds(&cart));
        cart.add_item(item(2, "3.50"), 1).unwrap();
        assert!(count_invariant_holds(&cart));
        cart.add_item(item(1, "5.00"), 4).unwrap();
        assert!(count_invariant_holds(&cart));
        cart.set_quantity(ProductId::new(2), 6).unwrap();
        assert!(count_invariant_holds(&cart));
        cart.remove_item(ProductId::new(1));
        assert!(count_invariant_holds(&cart));
        cart.set_quantity(ProductId::new(2), 0).unwrap();
        assert!(count_invariant_holds(&cart));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subtotal() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "5.00"), 2).unwrap();
        cart.add_item(item(2, "3.25"), 1).unwrap();

        assert_eq!(cart.subtotal(), "13.25".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_cart_item_wire_shape() {
        let line = CartItem {
            id: ProductId::new(3),
            title: "Mens Cotton Jacket".to_string(),
            price: "55.99".parse().unwrap(),
            image: "https://img.example/3.jpg".to_string(),
            quantity: 2,
        };

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["quantity"], 2);
        // Price crosses the wire as a JSON number, not a string
        assert!(json["price"].is_f64());
    }
}
