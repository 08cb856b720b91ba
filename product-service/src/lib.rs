//! Product store service: a JSON resource server for a single `products` table.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod middleware;
pub mod server;
