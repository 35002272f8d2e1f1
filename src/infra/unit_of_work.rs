//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories and manages the transaction
//! lifecycle: begin, commit on success, rollback on any error, on every
//! exit path. The order-creation workflow runs its address upserts, number
//! allocation and ledger append through one `transaction()` call so the
//! registry and the ledger cannot disagree after a mid-workflow failure.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction,
    IsolationLevel, TransactionTrait,
};
use std::sync::Arc;

use super::repositories::{
    address_create, address_find, address_update, order_append, order_next_number,
    AddressRepository, AddressStore, OrderRepository, OrderStore, UserRepository, UserStore,
};
use crate::domain::{AddressEntry, AddressInput, NewOrderRecord, OrderCategory};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction
/// management. The generic `transaction` method keeps this trait
/// non-mockable; tests either mock individual repositories or run against
/// an embedded database.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get address registry repository
    fn addresses(&self) -> Arc<dyn AddressRepository>;

    /// Get order ledger repository
    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled back
    /// on error. Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction. The context borrows the transaction
/// to ensure proper lifetime management.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get address registry repository for this transaction
    pub fn addresses(&self) -> TxAddressRepository<'_> {
        TxAddressRepository::new(self.txn)
    }

    /// Get order ledger repository for this transaction
    pub fn orders(&self) -> TxOrderRepository<'_> {
        TxOrderRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    address_repo: Arc<AddressStore>,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let address_repo = Arc::new(AddressStore::new(db.clone()));
        let order_repo = Arc::new(OrderStore::new(db.clone()));
        Self {
            db,
            user_repo,
            address_repo,
            order_repo,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressRepository> {
        self.address_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // SQLite rejects explicit isolation and access-mode options
        let txn = match self.db.get_database_backend() {
            DatabaseBackend::Sqlite => self.db.begin().await,
            _ => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::ReadCommitted),
                        Some(AccessMode::ReadWrite),
                    )
                    .await
            }
        }
        .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-scoped address registry repository.
pub struct TxAddressRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAddressRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Find an entry by site identifier
    pub async fn find(&self, site_id: &str) -> AppResult<Option<AddressEntry>> {
        address_find(self.txn, site_id).await
    }

    /// Insert a new active entry
    pub async fn create(
        &self,
        site_id: &str,
        input: &AddressInput,
        actor: &str,
    ) -> AppResult<()> {
        address_create(self.txn, site_id, input, actor).await
    }

    /// Overwrite an existing entry, optionally reactivating it
    pub async fn update(
        &self,
        site_id: &str,
        input: &AddressInput,
        actor: &str,
        reactivate: bool,
    ) -> AppResult<()> {
        address_update(self.txn, site_id, input, actor, reactivate).await
    }
}

/// Transaction-scoped order ledger repository.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Next sequential number for (category, year)
    pub async fn next_number(&self, category: OrderCategory, year: i32) -> i32 {
        order_next_number(self.txn, category, year).await
    }

    /// Insert one ledger row
    pub async fn append(&self, record: NewOrderRecord) -> AppResult<()> {
        order_append(self.txn, record).await
    }
}
