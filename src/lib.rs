//! Point-of-sale and order tracking for a single pizzeria.
//!
//! Customers browse the menu, build a cart, and check out; staff move
//! orders through the kitchen; cashiers dispatch deliveries, confirm
//! payments, and print receipts. The interactive screens live outside this
//! crate and call into [`commands`] with the shared [`Database`] and the
//! current [`Session`].

pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod session;


pub use commands::{auth, images, orders, products, receipts};
pub use config::Config;
pub use db::Database;
pub use errors::{Error, Result};
pub use logging::setup_tracing;
pub use session::{Cart, CartLine, Session};
