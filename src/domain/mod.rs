//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod address;
pub mod heuristics;
pub mod normalize;
pub mod order;
pub mod password;
pub mod user;

pub use address::{AddressEntry, AddressInput, AddressStatus};
pub use normalize::normalize;
pub use order::{CreatedOrder, LineItem, NewOrderRecord, OrderCategory, OrderSummary};
pub use password::{Password, PasswordMatch};
pub use user::{User, UserResponse, UserRole};
