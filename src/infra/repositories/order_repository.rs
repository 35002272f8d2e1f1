//! Order ledger repository.
//!
//! Append-mostly: rows are inserted by the order-creation workflow and read
//! back for the per-site history display and number allocation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::service_order::{self, Entity as OrderEntity};
use crate::config::ORDER_HISTORY_LIMIT;
use crate::domain::{NewOrderRecord, OrderCategory, OrderSummary};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order ledger operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Most recent orders referencing a site identifier, newest first.
    /// Read errors soft-fail to an empty list; this is display-only data.
    async fn history(&self, site_id: &str) -> Vec<OrderSummary>;

    /// Current maximum number for (category, year) plus one, or 1 when the
    /// scope is empty. Read errors fall back to 1 (logged); the unique index
    /// on the ledger catches the collision this can cause.
    async fn next_number(&self, category: OrderCategory, year: i32) -> i32;

    /// Insert one ledger row
    async fn append(&self, record: NewOrderRecord) -> AppResult<()>;
}

/// SeaORM-backed order ledger.
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn history(&self, site_id: &str) -> Vec<OrderSummary> {
        history(&self.db, site_id).await
    }

    async fn next_number(&self, category: OrderCategory, year: i32) -> i32 {
        next_number(&self.db, category, year).await
    }

    async fn append(&self, record: NewOrderRecord) -> AppResult<()> {
        append(&self.db, record).await
    }
}

// Connection-generic implementations shared by the store and the
// transaction-scoped repository.

pub(crate) async fn history<C: ConnectionTrait>(db: &C, site_id: &str) -> Vec<OrderSummary> {
    // `site_ids` is hyphen-joined, so match on hyphen boundaries; a bare
    // substring match would let P104 pull in orders for P1042.
    let result = OrderEntity::find()
        .filter(
            Condition::any()
                .add(service_order::Column::SiteId.eq(site_id))
                .add(service_order::Column::SiteIds.eq(site_id))
                .add(service_order::Column::SiteIds.starts_with(format!("{site_id}-")))
                .add(service_order::Column::SiteIds.ends_with(format!("-{site_id}")))
                .add(service_order::Column::SiteIds.contains(format!("-{site_id}-"))),
        )
        .order_by_desc(service_order::Column::CreatedAt)
        .limit(ORDER_HISTORY_LIMIT)
        .all(db)
        .await;

    match result {
        Ok(models) => models.into_iter().map(OrderSummary::from).collect(),
        Err(e) => {
            tracing::warn!(site_id, "Order history lookup failed: {}", e);
            Vec::new()
        }
    }
}

pub(crate) async fn next_number<C: ConnectionTrait>(
    db: &C,
    category: OrderCategory,
    year: i32,
) -> i32 {
    let result = OrderEntity::find()
        .select_only()
        .column_as(service_order::Column::Number.max(), "max_number")
        .filter(service_order::Column::Category.eq(category.label()))
        .filter(service_order::Column::Year.eq(year))
        .into_tuple::<Option<i32>>()
        .one(db)
        .await;

    match result {
        Ok(max) => max.flatten().unwrap_or(0) + 1,
        Err(e) => {
            tracing::warn!(
                category = category.label(),
                year,
                "Number allocation read failed, falling back to 1: {}",
                e
            );
            1
        }
    }
}

pub(crate) async fn append<C: ConnectionTrait>(db: &C, record: NewOrderRecord) -> AppResult<()> {
    let active_model = service_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        number: Set(record.number),
        category: Set(record.category),
        year: Set(record.year),
        issued_on: Set(record.issued_on),
        site_id: Set(record.site_id),
        site_ids: Set(record.site_ids),
        action_type: Set(record.action_type),
        action_type_norm: Set(record.action_type_norm),
        item_type: Set(record.item_type),
        item_type_norm: Set(record.item_type_norm),
        street: Set(record.street),
        neighborhood: Set(record.neighborhood),
        neighborhood_norm: Set(record.neighborhood_norm),
        complement: Set(record.complement),
        description: Set(record.description),
        created_by: Set(record.created_by),
        created_at: Set(Utc::now()),
    };

    active_model.insert(db).await.map_err(AppError::from)?;
    Ok(())
}
