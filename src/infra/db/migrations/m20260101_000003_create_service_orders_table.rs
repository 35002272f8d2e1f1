//! Migration: Create the service_orders ledger table.
//!
//! The unique index on (category, year, number) backs the per-scope
//! sequential numbering invariant: if two instances race to the same
//! number, the second insert fails instead of silently duplicating.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceOrders::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceOrders::Number).integer().not_null())
                    .col(ColumnDef::new(ServiceOrders::Category).string().not_null())
                    .col(ColumnDef::new(ServiceOrders::Year).integer().not_null())
                    .col(ColumnDef::new(ServiceOrders::IssuedOn).date().not_null())
                    .col(ColumnDef::new(ServiceOrders::SiteId).string().not_null())
                    .col(ColumnDef::new(ServiceOrders::SiteIds).string().not_null())
                    .col(ColumnDef::new(ServiceOrders::ActionType).string().not_null())
                    .col(
                        ColumnDef::new(ServiceOrders::ActionTypeNorm)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceOrders::ItemType).string().not_null())
                    .col(
                        ColumnDef::new(ServiceOrders::ItemTypeNorm)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceOrders::Street).string().not_null())
                    .col(
                        ColumnDef::new(ServiceOrders::Neighborhood)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceOrders::NeighborhoodNorm)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceOrders::Complement).string().not_null())
                    .col(ColumnDef::new(ServiceOrders::Description).text().not_null())
                    .col(ColumnDef::new(ServiceOrders::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(ServiceOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_orders_scope_number")
                    .table(ServiceOrders::Table)
                    .col(ServiceOrders::Category)
                    .col(ServiceOrders::Year)
                    .col(ServiceOrders::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // History lookups filter by the primary site identifier
        manager
            .create_index(
                Index::create()
                    .name("idx_service_orders_site_id")
                    .table(ServiceOrders::Table)
                    .col(ServiceOrders::SiteId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_service_orders_site_id")
                    .table(ServiceOrders::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_service_orders_scope_number")
                    .table(ServiceOrders::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ServiceOrders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServiceOrders {
    Table,
    Id,
    Number,
    Category,
    Year,
    IssuedOn,
    SiteId,
    SiteIds,
    ActionType,
    ActionTypeNorm,
    ItemType,
    ItemTypeNorm,
    Street,
    Neighborhood,
    NeighborhoodNorm,
    Complement,
    Description,
    CreatedBy,
    CreatedAt,
}
