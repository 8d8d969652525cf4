use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Maps a closed enum onto the canonical TEXT values kept in the store.
/// Unknown stored values fail the read instead of defaulting.
macro_rules! storage_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        concat!("unknown ", stringify!($name), " value: {}"),
                        other
                    )),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

/// Capability view a user is routed to after login.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "customer")]
    Customer,
    #[serde(rename = "staff")]
    Staff,
    #[serde(rename = "cashier")]
    Cashier,
}

storage_enum!(Role {
    Customer => "customer",
    Staff => "staff",
    Cashier => "cashier",
});

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Preparing,
    #[serde(rename = "Ready for Delivery")]
    ReadyForDelivery,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Completed,
}

storage_enum!(OrderStatus {
    Pending => "Pending",
    Preparing => "Preparing",
    ReadyForDelivery => "Ready for Delivery",
    OutForDelivery => "Out for Delivery",
    Completed => "Completed",
});

/// "Online" is a label only; no gateway sits behind it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Online,
}

storage_enum!(PaymentMethod {
    Cash => "Cash",
    Online => "Online",
});

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
}

storage_enum!(PaymentStatus {
    Pending => "Pending",
    Paid => "Paid",
});

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    #[serde(rename = "Picked Up")]
    PickedUp,
    Delivered,
}

storage_enum!(DeliveryStatus {
    PickedUp => "Picked Up",
    Delivered => "Delivered",
});

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub available: bool,
    pub image_path: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub price: f64,
    pub image_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub available: bool,
    pub image_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total: f64,
    pub delivery_address: String,
    pub contact_number: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub qty: i32,
    /// Product price captured at checkout; later price edits never touch it.
    pub unit_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Delivery {
    pub id: i64,
    pub order_id: i64,
    pub delivery_person: String,
    pub pickup_time: String,
    pub delivered_at: Option<String>,
    pub status: DeliveryStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub delivery_address: String,
    pub contact_number: String,
    pub payment_method: PaymentMethod,
}

/// Row of the staff kitchen queue (Pending and Preparing orders).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KitchenOrder {
    pub id: i64,
    pub customer_name: String,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: String,
}

/// Row of the customer's own order history. Delivery columns fall back to
/// "Not yet dispatched" / "N/A" until a dispatch happens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerOrder {
    pub id: i64,
    pub status: OrderStatus,
    pub delivery_status: String,
    pub delivery_person: String,
    pub total: f64,
    pub created_at: String,
}

/// Row of the cashier's order board, joined with the first delivery and
/// payment rows of each order.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CashierOrder {
    pub id: i64,
    pub status: OrderStatus,
    pub delivery_status: Option<DeliveryStatus>,
    pub delivery_person: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub total: f64,
    pub created_at: String,
}

/// Everything the receipt needs for one order.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub customer_name: String,
    pub delivery_person: Option<String>,
    pub items: Vec<OrderItem>,
}
