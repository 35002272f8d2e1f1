//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
pub mod container;
mod order_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AuthService, Authenticator, Claims, LoginResponse, RegisterInput, TokenResponse,
};
pub use order_service::{OrderCompiler, OrderForm, OrderService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
