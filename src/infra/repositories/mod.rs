//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod address_repository;
pub(crate) mod entities;
mod order_repository;
mod user_repository;

pub use address_repository::{AddressRepository, AddressStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use user_repository::{UserRepository, UserStore};

pub(crate) use address_repository::{
    create as address_create, find as address_find, update as address_update,
};
pub(crate) use order_repository::{append as order_append, next_number as order_next_number};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use address_repository::MockAddressRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
