//! Printable receipts. Rendering is a pure function of the stored order;
//! the bytes are plain text, one page per `ITEMS_PER_PAGE` item lines,
//! pages separated by form feeds for the printer.

use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::orders;
use crate::db::Database;
use crate::errors::{Error, Result};

const ITEMS_PER_PAGE: usize = 40;

/// Renders the receipt document for one order.
pub fn render_receipt(db: &Database, order_id: i64) -> Result<Vec<u8>> {
    let details = orders::order_details(db, order_id)?;

    let mut doc = String::new();
    doc.push_str("========================================\n");
    doc.push_str("           PIZZERIA RECEIPT\n");
    doc.push_str("========================================\n\n");
    doc.push_str(&format!("Order ID: {}\n", details.order.id));
    doc.push_str(&format!("Date: {}\n", details.order.created_at));
    doc.push_str(&format!("Customer: {}\n", details.customer_name));
    doc.push_str(&format!("Address: {}\n", details.order.delivery_address));
    doc.push_str(&format!("Payment: {}\n", details.order.payment_method));
    doc.push_str(&format!(
        "Delivery Person: {}\n",
        details.delivery_person.as_deref().unwrap_or("N/A")
    ));
    doc.push_str("\nItems:\n");

    for (i, item) in details.items.iter().enumerate() {
        if i > 0 && i % ITEMS_PER_PAGE == 0 {
            doc.push_str(&format!(
                "\x0c\nOrder ID: {} (continued)\n\nItems:\n",
                details.order.id
            ));
        }
        let name = item.product_name.as_deref().unwrap_or("(removed product)");
        let extended = item.unit_price * f64::from(item.qty);
        doc.push_str(&format!("  {} x{} - \u{20b1}{:.2}\n", name, item.qty, extended));
    }

    doc.push_str(&format!("\nTotal: \u{20b1}{:.2}\n", details.order.total));
    doc.push_str("\nThank you for your order!\n");

    Ok(doc.into_bytes())
}

/// Writes the rendered receipt under `dir` as `receipt_order_<id>.txt`.
pub fn write_receipt(db: &Database, order_id: i64, dir: &Path) -> Result<PathBuf> {
    let bytes = render_receipt(db, order_id)?;

    fs::create_dir_all(dir)
        .map_err(|e| Error::Storage(format!("cannot create receipt directory: {e}")))?;

    let path = dir.join(format!("receipt_order_{order_id}.txt"));
    fs::write(&path, bytes).map_err(|e| Error::Storage(format!("cannot write receipt: {e}")))?;

    tracing::info!(order_id, path = %path.display(), "receipt written");
    Ok(path)
}
