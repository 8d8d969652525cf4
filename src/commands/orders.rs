use rusqlite::{Connection, OptionalExtension};

use crate::db::Database;
use crate::errors::{Error, Result};
use crate::models::{
    CashierOrder, CheckoutRequest, CustomerOrder, Delivery, DeliveryStatus, KitchenOrder, Order,
    OrderDetails, OrderItem, OrderStatus, Payment, PaymentMethod, PaymentStatus,
};
use crate::session::Session;

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn order_status(conn: &Connection, order_id: i64) -> Result<OrderStatus> {
    conn.query_row(
        "SELECT status FROM orders WHERE id = ?1",
        [order_id],
        |row| row.get(0),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::NotFound(format!("order #{order_id}")),
        other => Error::from(other),
    })
}

/// Advances one order exactly one step. The expected current status is
/// checked first and repeated in the UPDATE guard, so an out-of-order or
/// repeated transition changes nothing.
fn transition(conn: &Connection, order_id: i64, from: OrderStatus, to: OrderStatus) -> Result<()> {
    let current = order_status(conn, order_id)?;
    if current != from {
        return Err(Error::Validation(format!(
            "order #{order_id} is {current}, expected {from}"
        )));
    }

    conn.execute(
        "UPDATE orders SET status = ?1 WHERE id = ?2 AND status = ?3",
        rusqlite::params![to, order_id, from],
    )?;

    if conn.changes() == 0 {
        return Err(Error::Validation(format!(
            "order #{order_id} is no longer {from}"
        )));
    }

    tracing::info!(order_id, from = %from, to = %to, "order status advanced");
    Ok(())
}

/// Converts the session cart into a committed order.
///
/// Inserts the order, its line items (snapshotting each line's price), and
/// the payment row in one transaction; either all three commit or none do.
/// The cart is cleared only after the commit succeeds.
pub fn checkout(db: &Database, session: &mut Session, request: CheckoutRequest) -> Result<i64> {
    if session.cart.is_empty() {
        return Err(Error::Validation("your cart is empty".to_string()));
    }
    if request.delivery_address.trim().is_empty() || request.contact_number.trim().is_empty() {
        return Err(Error::Validation(
            "delivery address and contact number are required".to_string(),
        ));
    }

    let total = session.cart.total();

    let mut conn = db.lock()?;
    let tx = conn.transaction().map_err(Error::from)?;

    tx.execute(
        "INSERT INTO orders (user_id, total, delivery_address, contact_number, payment_method, status)
         VALUES (?1, ?2, ?3, ?4, ?5, 'Pending')",
        rusqlite::params![
            session.user.id,
            total,
            request.delivery_address,
            request.contact_number,
            request.payment_method,
        ],
    )?;

    let order_id = tx.last_insert_rowid();

    for line in session.cart.lines() {
        tx.execute(
            "INSERT INTO order_items (order_id, product_id, qty, unit_price) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![order_id, line.product.id, line.qty, line.product.price],
        )?;
    }

    // Cash settles at the counter; Online stays pending until the cashier
    // confirms it.
    let (payment_status, paid_at) = match request.payment_method {
        PaymentMethod::Cash => (PaymentStatus::Paid, Some(now())),
        PaymentMethod::Online => (PaymentStatus::Pending, None),
    };

    tx.execute(
        "INSERT INTO payments (order_id, amount, method, status, paid_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![order_id, total, request.payment_method, payment_status, paid_at],
    )?;

    tx.commit()?;

    session.cart.clear();
    tracing::info!(order_id, total, user_id = session.user.id, "order placed");
    Ok(order_id)
}

/// Staff: Pending -> Preparing.
pub fn mark_preparing(db: &Database, order_id: i64) -> Result<()> {
    let conn = db.lock()?;
    transition(&conn, order_id, OrderStatus::Pending, OrderStatus::Preparing)
}

/// Staff: Preparing -> Ready for Delivery.
pub fn mark_ready(db: &Database, order_id: i64) -> Result<()> {
    let conn = db.lock()?;
    transition(
        &conn,
        order_id,
        OrderStatus::Preparing,
        OrderStatus::ReadyForDelivery,
    )
}

/// Cashier: assigns a delivery person to a ready order and moves it out
/// for delivery. The delivery row and the status change commit together.
pub fn dispatch(db: &Database, order_id: i64, delivery_person: &str) -> Result<()> {
    if delivery_person.trim().is_empty() {
        return Err(Error::Validation(
            "delivery person name is required".to_string(),
        ));
    }

    let mut conn = db.lock()?;
    let tx = conn.transaction().map_err(Error::from)?;

    tx.execute(
        "INSERT INTO deliveries (order_id, delivery_person, pickup_time, status) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![order_id, delivery_person, now(), DeliveryStatus::PickedUp],
    )?;
    transition(
        &tx,
        order_id,
        OrderStatus::ReadyForDelivery,
        OrderStatus::OutForDelivery,
    )?;

    tx.commit()?;

    tracing::info!(order_id, delivery_person, "order dispatched");
    Ok(())
}

/// Cashier: closes out a delivery. Requires the delivery row created by
/// dispatch; stamps it delivered and completes the order atomically.
pub fn mark_delivered(db: &Database, order_id: i64) -> Result<()> {
    let mut conn = db.lock()?;
    let tx = conn.transaction().map_err(Error::from)?;

    let delivery_id: i64 = tx
        .query_row(
            "SELECT id FROM deliveries WHERE order_id = ?1 ORDER BY id LIMIT 1",
            [order_id],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound(format!("delivery for order #{order_id}"))
            }
            other => Error::from(other),
        })?;

    tx.execute(
        "UPDATE deliveries SET delivered_at = ?1, status = ?2 WHERE id = ?3",
        rusqlite::params![now(), DeliveryStatus::Delivered, delivery_id],
    )?;
    transition(
        &tx,
        order_id,
        OrderStatus::OutForDelivery,
        OrderStatus::Completed,
    )?;

    tx.commit()?;

    tracing::info!(order_id, "order delivered");
    Ok(())
}

/// Cashier: confirms a pending payment. Rejected when the order has no
/// payment row or the payment is already settled; nothing changes then.
pub fn mark_payment_paid(db: &Database, order_id: i64) -> Result<()> {
    let conn = db.lock()?;

    let (payment_id, status): (i64, PaymentStatus) = conn
        .query_row(
            "SELECT id, status FROM payments WHERE order_id = ?1 ORDER BY id LIMIT 1",
            [order_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound(format!("payment for order #{order_id}"))
            }
            other => Error::from(other),
        })?;

    if status == PaymentStatus::Paid {
        return Err(Error::Validation(format!(
            "order #{order_id} is already marked as paid"
        )));
    }

    conn.execute(
        "UPDATE payments SET status = ?1, paid_at = ?2 WHERE id = ?3",
        rusqlite::params![PaymentStatus::Paid, now(), payment_id],
    )?;

    tracing::info!(order_id, "payment confirmed");
    Ok(())
}

/// Staff queue: orders still in the kitchen, oldest first.
pub fn kitchen_orders(db: &Database) -> Result<Vec<KitchenOrder>> {
    let conn = db.lock()?;

    let mut stmt = conn.prepare(
        "SELECT o.id, u.full_name, o.status, o.total, o.created_at
         FROM orders o
         JOIN users u ON o.user_id = u.id
         WHERE o.status IN ('Pending', 'Preparing')
         ORDER BY o.created_at ASC, o.id ASC",
    )?;

    let orders = stmt
        .query_map([], |row| {
            let full_name: String = row.get(1)?;
            Ok(KitchenOrder {
                id: row.get(0)?,
                customer_name: if full_name.trim().is_empty() {
                    "Unknown".to_string()
                } else {
                    full_name
                },
                status: row.get(2)?,
                total: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(orders)
}

/// Cashier board: every order, newest first, with its first delivery and
/// payment rows.
pub fn all_orders(db: &Database) -> Result<Vec<CashierOrder>> {
    let conn = db.lock()?;

    let mut stmt = conn.prepare(
        "SELECT o.id, o.status, o.total, o.created_at,
                (SELECT d.status FROM deliveries d WHERE d.order_id = o.id ORDER BY d.id LIMIT 1),
                (SELECT d.delivery_person FROM deliveries d WHERE d.order_id = o.id ORDER BY d.id LIMIT 1),
                (SELECT p.method FROM payments p WHERE p.order_id = o.id ORDER BY p.id LIMIT 1),
                (SELECT p.status FROM payments p WHERE p.order_id = o.id ORDER BY p.id LIMIT 1)
         FROM orders o
         ORDER BY o.created_at DESC, o.id DESC",
    )?;

    let orders = stmt
        .query_map([], |row| {
            Ok(CashierOrder {
                id: row.get(0)?,
                status: row.get(1)?,
                total: row.get(2)?,
                created_at: row.get(3)?,
                delivery_status: row.get(4)?,
                delivery_person: row.get(5)?,
                payment_method: row.get(6)?,
                payment_status: row.get(7)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(orders)
}

/// Customer history: own orders only, newest first, with readable
/// placeholders until a delivery exists.
pub fn customer_orders(db: &Database, user_id: i64) -> Result<Vec<CustomerOrder>> {
    let conn = db.lock()?;

    let mut stmt = conn.prepare(
        "SELECT o.id, o.status, o.total, o.created_at,
                (SELECT d.status FROM deliveries d WHERE d.order_id = o.id ORDER BY d.id LIMIT 1),
                (SELECT d.delivery_person FROM deliveries d WHERE d.order_id = o.id ORDER BY d.id LIMIT 1)
         FROM orders o
         WHERE o.user_id = ?1
         ORDER BY o.created_at DESC, o.id DESC",
    )?;

    let orders = stmt
        .query_map([user_id], |row| {
            let delivery_status: Option<DeliveryStatus> = row.get(4)?;
            let delivery_person: Option<String> = row.get(5)?;
            Ok(CustomerOrder {
                id: row.get(0)?,
                status: row.get(1)?,
                total: row.get(2)?,
                created_at: row.get(3)?,
                delivery_status: delivery_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Not yet dispatched".to_string()),
                delivery_person: delivery_person.unwrap_or_else(|| "N/A".to_string()),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(orders)
}

/// One order with its customer, delivery person, and itemized lines.
pub fn order_details(db: &Database, order_id: i64) -> Result<OrderDetails> {
    let conn = db.lock()?;

    let (order, customer_name, delivery_person) = conn
        .query_row(
            "SELECT o.id, o.user_id, o.total, o.delivery_address, o.contact_number,
                    o.payment_method, o.status, o.created_at, u.full_name,
                    (SELECT d.delivery_person FROM deliveries d WHERE d.order_id = o.id ORDER BY d.id LIMIT 1)
             FROM orders o
             JOIN users u ON o.user_id = u.id
             WHERE o.id = ?1",
            [order_id],
            |row| {
                Ok((
                    Order {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        total: row.get(2)?,
                        delivery_address: row.get(3)?,
                        contact_number: row.get(4)?,
                        payment_method: row.get(5)?,
                        status: row.get(6)?,
                        created_at: row.get(7)?,
                    },
                    row.get::<_, String>(8)?,
                    row.get::<_, Option<String>>(9)?,
                ))
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound(format!("order #{order_id}")),
            other => Error::from(other),
        })?;

    let mut stmt = conn.prepare(
        "SELECT oi.id, oi.order_id, oi.product_id, p.name, oi.qty, oi.unit_price
         FROM order_items oi
         LEFT JOIN products p ON oi.product_id = p.id
         WHERE oi.order_id = ?1
         ORDER BY oi.id",
    )?;

    let items = stmt
        .query_map([order_id], |row| {
            Ok(OrderItem {
                id: row.get(0)?,
                order_id: row.get(1)?,
                product_id: row.get(2)?,
                product_name: row.get(3)?,
                qty: row.get(4)?,
                unit_price: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(OrderDetails {
        order,
        customer_name,
        delivery_person,
        items,
    })
}

/// First payment row of an order. Extras are tolerated but never read.
pub fn payment_for_order(db: &Database, order_id: i64) -> Result<Payment> {
    let conn = db.lock()?;

    conn.query_row(
        "SELECT id, order_id, amount, method, status, paid_at
         FROM payments
         WHERE order_id = ?1
         ORDER BY id LIMIT 1",
        [order_id],
        |row| {
            Ok(Payment {
                id: row.get(0)?,
                order_id: row.get(1)?,
                amount: row.get(2)?,
                method: row.get(3)?,
                status: row.get(4)?,
                paid_at: row.get(5)?,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            Error::NotFound(format!("payment for order #{order_id}"))
        }
        other => Error::from(other),
    })
}

/// First delivery row of an order, if the order has been dispatched.
pub fn delivery_for_order(db: &Database, order_id: i64) -> Result<Option<Delivery>> {
    let conn = db.lock()?;

    let delivery = conn
        .query_row(
            "SELECT id, order_id, delivery_person, pickup_time, delivered_at, status
             FROM deliveries
             WHERE order_id = ?1
             ORDER BY id LIMIT 1",
            [order_id],
            |row| {
                Ok(Delivery {
                    id: row.get(0)?,
                    order_id: row.get(1)?,
                    delivery_person: row.get(2)?,
                    pickup_time: row.get(3)?,
                    delivered_at: row.get(4)?,
                    status: row.get(5)?,
                })
            },
        )
        .optional()?;

    Ok(delivery)
}
