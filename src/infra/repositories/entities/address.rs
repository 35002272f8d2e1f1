//! SeaORM entity for the addresses table.
//!
//! Keyed by the externally assigned site identifier, not a surrogate key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub site_id: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub complement: Option<String>,
    pub status: String,
    pub last_inspector: String,
    pub last_inspection_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::AddressEntry {
    fn from(model: Model) -> Self {
        Self {
            site_id: model.site_id,
            street: model.street,
            number: model.number,
            neighborhood: model.neighborhood,
            complement: model.complement,
            status: crate::domain::AddressStatus::from(model.status.as_str()),
            last_inspector: model.last_inspector,
            last_inspection_at: model.last_inspection_at,
        }
    }
}
