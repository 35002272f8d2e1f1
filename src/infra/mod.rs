pub mod db;
pub mod docgen;
pub mod mailer;
pub mod repositories;
pub mod session;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use mailer::{Mailer, SmtpMailer};
pub use repositories::{
    AddressRepository, AddressStore, OrderRepository, OrderStore, UserRepository, UserStore,
};
pub use session::SessionCache;
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use mailer::MockMailer;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockAddressRepository, MockOrderRepository, MockUserRepository};
