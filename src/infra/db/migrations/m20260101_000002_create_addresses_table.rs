//! Migration: Create the addresses table.
//!
//! The primary key is the externally assigned site identifier.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addresses::SiteId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addresses::Street).string().not_null())
                    .col(ColumnDef::new(Addresses::Number).string().not_null())
                    .col(ColumnDef::new(Addresses::Neighborhood).string().not_null())
                    .col(ColumnDef::new(Addresses::Complement).string().null())
                    .col(ColumnDef::new(Addresses::Status).string().not_null())
                    .col(ColumnDef::new(Addresses::LastInspector).string().not_null())
                    .col(
                        ColumnDef::new(Addresses::LastInspectionAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Addresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Addresses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Inactive entries are filtered often enough to warrant an index
        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_status")
                    .table(Addresses::Table)
                    .col(Addresses::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_addresses_status")
                    .table(Addresses::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Addresses {
    Table,
    SiteId,
    Street,
    Number,
    Neighborhood,
    Complement,
    Status,
    LastInspector,
    LastInspectionAt,
    CreatedAt,
    UpdatedAt,
}
