//! Address registry repository.
//!
//! Every store failure here wraps into the generic "address operation
//! failed" error; the order-creation workflow aborts on any of them.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set,
};

use super::entities::address::{self, Entity as AddressEntity};
use crate::domain::{AddressEntry, AddressInput, AddressStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Address registry operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Find an entry by site identifier
    async fn find(&self, site_id: &str) -> AppResult<Option<AddressEntry>>;

    /// Insert a new active entry; inspection metadata is set to now/actor
    async fn create(&self, site_id: &str, input: &AddressInput, actor: &str) -> AppResult<()>;

    /// Overwrite address fields and inspection metadata. Flips status to
    /// active only when `reactivate` is true; never flips to inactive.
    async fn update(
        &self,
        site_id: &str,
        input: &AddressInput,
        actor: &str,
        reactivate: bool,
    ) -> AppResult<()>;
}

/// SeaORM-backed address registry.
pub struct AddressStore {
    db: DatabaseConnection,
}

impl AddressStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AddressRepository for AddressStore {
    async fn find(&self, site_id: &str) -> AppResult<Option<AddressEntry>> {
        find(&self.db, site_id).await
    }

    async fn create(&self, site_id: &str, input: &AddressInput, actor: &str) -> AppResult<()> {
        create(&self.db, site_id, input, actor).await
    }

    async fn update(
        &self,
        site_id: &str,
        input: &AddressInput,
        actor: &str,
        reactivate: bool,
    ) -> AppResult<()> {
        update(&self.db, site_id, input, actor, reactivate).await
    }
}

// Connection-generic implementations shared by the store and the
// transaction-scoped repository.

pub(crate) async fn find<C: ConnectionTrait>(
    db: &C,
    site_id: &str,
) -> AppResult<Option<AddressEntry>> {
    let result = AddressEntity::find_by_id(site_id)
        .one(db)
        .await
        .map_err(AppError::Address)?;

    Ok(result.map(AddressEntry::from))
}

pub(crate) async fn create<C: ConnectionTrait>(
    db: &C,
    site_id: &str,
    input: &AddressInput,
    actor: &str,
) -> AppResult<()> {
    let now = Utc::now();
    let active_model = address::ActiveModel {
        site_id: Set(site_id.to_string()),
        street: Set(input.street.clone()),
        number: Set(input.number.clone()),
        neighborhood: Set(input.neighborhood.clone()),
        complement: Set(input.complement.clone()),
        status: Set(AddressStatus::Active.as_str().to_string()),
        last_inspector: Set(actor.to_string()),
        last_inspection_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
    };

    active_model.insert(db).await.map_err(AppError::Address)?;
    Ok(())
}

pub(crate) async fn update<C: ConnectionTrait>(
    db: &C,
    site_id: &str,
    input: &AddressInput,
    actor: &str,
    reactivate: bool,
) -> AppResult<()> {
    let model = AddressEntity::find_by_id(site_id)
        .one(db)
        .await
        .map_err(AppError::Address)?
        .ok_or(AppError::NotFound)?;

    let now = Utc::now();
    let mut active: address::ActiveModel = model.into();
    active.street = Set(input.street.clone());
    active.number = Set(input.number.clone());
    active.neighborhood = Set(input.neighborhood.clone());
    active.complement = Set(input.complement.clone());
    active.last_inspector = Set(actor.to_string());
    active.last_inspection_at = Set(now);
    active.updated_at = Set(now);
    if reactivate {
        active.status = Set(AddressStatus::Active.as_str().to_string());
    }

    active.update(db).await.map_err(AppError::Address)?;
    Ok(())
}
