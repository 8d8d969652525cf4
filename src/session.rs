//! Per-login session state: the authenticated user and their cart.
//!
//! A `Session` is created by login and dropped on logout, so cart contents
//! never outlive the visit. There is no persisted session token.

use std::collections::BTreeMap;

use crate::errors::{Error, Result};
use crate::models::{Product, User};

#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub cart: Cart,
}

impl Session {
    pub fn new(user: User) -> Self {
        Session {
            user,
            cart: Cart::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartLine {
    /// Snapshot of the product as it was when added; checkout prices come
    /// from here, not from a re-read of the catalog.
    pub product: Product,
    pub qty: i32,
}

/// In-memory selection of products, keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: BTreeMap<i64, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `qty` of a product. Quantities accumulate when the product is
    /// already in the cart.
    pub fn add(&mut self, product: Product, qty: i32) -> Result<()> {
        if qty <= 0 {
            return Err(Error::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }
        self.lines
            .entry(product.id)
            .and_modify(|line| line.qty += qty)
            .or_insert(CartLine { product, qty });
        Ok(())
    }

    /// Replaces the quantity of an existing line. No-op when the product is
    /// not in the cart.
    pub fn set_quantity(&mut self, product_id: i64, qty: i32) -> Result<()> {
        if qty <= 0 {
            return Err(Error::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }
        if let Some(line) = self.lines.get_mut(&product_id) {
            line.qty = qty;
        }
        Ok(())
    }

    /// Removes a line if present; no-op otherwise.
    pub fn remove(&mut self, product_id: i64) {
        self.lines.remove(&product_id);
    }

    /// Recomputed on every call, never cached.
    pub fn total(&self) -> f64 {
        self.lines
            .values()
            .map(|line| line.product.price * f64::from(line.qty))
            .sum()
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
