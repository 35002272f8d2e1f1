//! HTTP request handlers.

pub mod address_handler;
pub mod auth_handler;
pub mod order_handler;

pub use address_handler::address_routes;
pub use auth_handler::auth_routes;
pub use order_handler::order_routes;
