//! Create journeys and journey_stops tables migration.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_places_table::Places;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Journeys::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Journeys::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Journeys::Slug).string_len(128).not_null().unique_key())
                    .col(ColumnDef::new(Journeys::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Journeys::Description).text())
                    .col(
                        ColumnDef::new(Journeys::MoodTags)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Journeys::EstimatedDurationMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Journeys::EstimatedDistanceMeters)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Journeys::IdealConditions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Journeys::AcceptableConditions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Journeys::AvoidConditions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Journeys::IsPublished).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Journeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Journeys::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JourneyStops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JourneyStops::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(JourneyStops::JourneyId).string_len(36).not_null())
                    .col(ColumnDef::new(JourneyStops::PlaceId).string_len(36).not_null())
                    .col(ColumnDef::new(JourneyStops::OrderIndex).integer().not_null())
                    .col(ColumnDef::new(JourneyStops::Notes).text())
                    .col(ColumnDef::new(JourneyStops::DurationMinutes).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journey_stops_journey")
                            .from(JourneyStops::Table, JourneyStops::JourneyId)
                            .to(Journeys::Table, Journeys::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journey_stops_place")
                            .from(JourneyStops::Table, JourneyStops::PlaceId)
                            .to(Places::Table, Places::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (journey_id, order_index) - stop order is unique per journey
        manager
            .create_index(
                Index::create()
                    .name("idx_journey_stops_order_unique")
                    .table(JourneyStops::Table)
                    .col(JourneyStops::JourneyId)
                    .col(JourneyStops::OrderIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JourneyStops::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Journeys::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Journeys {
    Table,
    Id,
    Slug,
    Title,
    Description,
    MoodTags,
    EstimatedDurationMinutes,
    EstimatedDistanceMeters,
    IdealConditions,
    AcceptableConditions,
    AvoidConditions,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum JourneyStops {
    Table,
    Id,
    JourneyId,
    PlaceId,
    OrderIndex,
    Notes,
    DurationMinutes,
}
