//! Create places table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Places::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Places::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Places::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Places::Description).text())
                    .col(ColumnDef::new(Places::Category).string_len(64).not_null())
                    .col(ColumnDef::new(Places::Latitude).double().not_null())
                    .col(ColumnDef::new(Places::Longitude).double().not_null())
                    .col(ColumnDef::new(Places::Rating).double())
                    .col(ColumnDef::new(Places::Visited).boolean().not_null().default(false))
                    .col(ColumnDef::new(Places::PhotoUrl).text())
                    .col(ColumnDef::new(Places::OpeningHours).string_len(32))
                    .col(ColumnDef::new(Places::SearchKeywords).json_binary())
                    .col(ColumnDef::new(Places::BrandName).string_len(200))
                    .col(
                        ColumnDef::new(Places::IdealConditions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Places::AcceptableConditions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Places::AvoidConditions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Places::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Places::UpdatedAt).timestamp_with_time_zone())
                    .check(Expr::cust(
                        "latitude BETWEEN 12.95 AND 13.00 AND longitude BETWEEN 77.58 AND 77.65",
                    ))
                    .check(Expr::cust("rating IS NULL OR (rating >= 1.0 AND rating <= 5.0)"))
                    .to_owned(),
            )
            .await?;

        // Index: category (filtering)
        manager
            .create_index(
                Index::create()
                    .name("idx_places_category")
                    .table(Places::Table)
                    .col(Places::Category)
                    .to_owned(),
            )
            .await?;

        // Index: name (whitelist lookups and ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_places_name")
                    .table(Places::Table)
                    .col(Places::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Places::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Places {
    Table,
    Id,
    Name,
    Description,
    Category,
    Latitude,
    Longitude,
    Rating,
    Visited,
    PhotoUrl,
    OpeningHours,
    SearchKeywords,
    BrandName,
    IdealConditions,
    AcceptableConditions,
    AvoidConditions,
    CreatedAt,
    UpdatedAt,
}
