//! SeaORM entity for the service_orders ledger table.
//!
//! `(category, year, number)` carries a unique index; see the orders
//! migration.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: i32,
    pub category: String,
    pub year: i32,
    pub issued_on: Date,
    pub site_id: String,
    pub site_ids: String,
    pub action_type: String,
    pub action_type_norm: String,
    pub item_type: String,
    pub item_type_norm: String,
    pub street: String,
    pub neighborhood: String,
    pub neighborhood_norm: String,
    pub complement: String,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::OrderSummary {
    fn from(model: Model) -> Self {
        Self {
            number: model.number,
            category: model.category,
            issued_on: model.issued_on,
            action_type: model.action_type,
            item_type: model.item_type,
            street: model.street,
            neighborhood: model.neighborhood,
            created_by: model.created_by,
        }
    }
}
