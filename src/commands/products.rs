use std::collections::HashSet;

use crate::db::Database;
use crate::errors::{Error, Result};
use crate::models::{CreateProduct, Product, UpdateProduct};

fn product_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        available: row.get(3)?,
        image_path: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Menu shown to customers: available products only, deduplicated by
/// trimmed name (first occurrence wins). The dedupe guards the view against
/// duplicate catalog rows; storage itself does not enforce name uniqueness.
pub fn available_products(db: &Database) -> Result<Vec<Product>> {
    let conn = db.lock()?;

    let mut stmt = conn.prepare(
        "SELECT id, name, price, available, image_path, created_at
         FROM products
         WHERE available = 1
         ORDER BY id",
    )?;

    let products = stmt
        .query_map([], product_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut seen_names = HashSet::new();
    Ok(products
        .into_iter()
        .filter(|p| {
            let name = p.name.trim().to_string();
            !name.is_empty() && seen_names.insert(name)
        })
        .collect())
}

/// Full catalog for menu administration, unavailable entries included.
pub fn list_products(db: &Database) -> Result<Vec<Product>> {
    let conn = db.lock()?;

    let mut stmt = conn.prepare(
        "SELECT id, name, price, available, image_path, created_at
         FROM products
         ORDER BY name",
    )?;

    let products = stmt
        .query_map([], product_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(products)
}

pub fn create_product(db: &Database, product: CreateProduct) -> Result<Product> {
    if product.name.trim().is_empty() {
        return Err(Error::Validation("product name is required".to_string()));
    }

    let conn = db.lock()?;

    conn.execute(
        "INSERT INTO products (name, price, available, image_path) VALUES (?1, ?2, 1, ?3)",
        rusqlite::params![product.name, product.price, product.image_path],
    )?;

    let id = conn.last_insert_rowid();

    let product = conn.query_row(
        "SELECT id, name, price, available, image_path, created_at
         FROM products
         WHERE id = ?1",
        [id],
        product_from_row,
    )?;

    Ok(product)
}

/// Edits name, price, availability, or image path. Past orders keep their
/// `unit_price` snapshots regardless of price changes here.
pub fn update_product(db: &Database, product: UpdateProduct) -> Result<Product> {
    if product.name.trim().is_empty() {
        return Err(Error::Validation("product name is required".to_string()));
    }

    let conn = db.lock()?;

    conn.execute(
        "UPDATE products SET name = ?1, price = ?2, available = ?3, image_path = ?4 WHERE id = ?5",
        rusqlite::params![
            product.name,
            product.price,
            product.available,
            product.image_path,
            product.id
        ],
    )?;

    if conn.changes() == 0 {
        return Err(Error::NotFound(format!("product #{}", product.id)));
    }

    let product = conn.query_row(
        "SELECT id, name, price, available, image_path, created_at
         FROM products
         WHERE id = ?1",
        [product.id],
        product_from_row,
    )?;

    Ok(product)
}

pub fn delete_product(db: &Database, id: i64) -> Result<()> {
    let conn = db.lock()?;

    // Ordered products must stay resolvable for receipts and history
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM order_items WHERE product_id = ?1",
        [id],
        |row| row.get(0),
    )?;

    if count > 0 {
        return Err(Error::Validation(
            "cannot delete a product that has been ordered; mark it unavailable instead"
                .to_string(),
        ));
    }

    conn.execute("DELETE FROM products WHERE id = ?1", [id])?;

    Ok(())
}
