//! Service container.
//!
//! Central access point for the application services; handlers depend on
//! the service traits through this container, never on the concrete
//! implementations.

use std::sync::Arc;

use super::{AuthService, OrderService};
use crate::config::Config;
use crate::infra::{Persistence, SessionCache, SmtpMailer};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get order workflow service
    fn orders(&self) -> Arc<dyn OrderService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    order_service: Arc<dyn OrderService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(auth_service: Arc<dyn AuthService>, order_service: Arc<dyn OrderService>) -> Self {
        Self {
            auth_service,
            order_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{Authenticator, OrderCompiler};

        let uow = Arc::new(Persistence::new(db));
        let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));
        let session = Arc::new(SessionCache::new(config.session_file.clone()));
        let order_service = Arc::new(OrderCompiler::new(uow.clone(), &config));
        let auth_service = Arc::new(Authenticator::new(uow, mailer, session, config));

        Self {
            auth_service,
            order_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }
}
