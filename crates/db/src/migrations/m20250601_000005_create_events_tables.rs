//! Create event_sources and discovered_events tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventSources::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventSources::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(EventSources::Name).string_len(200).not_null())
                    .col(ColumnDef::new(EventSources::Url).text().not_null())
                    .col(ColumnDef::new(EventSources::SourceType).string_len(32).not_null())
                    .col(ColumnDef::new(EventSources::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(EventSources::LastFetchedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(EventSources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DiscoveredEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiscoveredEvents::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DiscoveredEvents::SourceId).string_len(36))
                    .col(ColumnDef::new(DiscoveredEvents::ExternalId).string_len(256))
                    .col(ColumnDef::new(DiscoveredEvents::Title).string_len(300).not_null())
                    .col(ColumnDef::new(DiscoveredEvents::Description).text())
                    .col(
                        ColumnDef::new(DiscoveredEvents::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscoveredEvents::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DiscoveredEvents::VenueName).string_len(200))
                    .col(ColumnDef::new(DiscoveredEvents::Latitude).double())
                    .col(ColumnDef::new(DiscoveredEvents::Longitude).double())
                    .col(
                        ColumnDef::new(DiscoveredEvents::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(DiscoveredEvents::QualityScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DiscoveredEvents::SourceUrl).text())
                    .col(
                        ColumnDef::new(DiscoveredEvents::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DiscoveredEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(DiscoveredEvents::ReviewedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_discovered_events_source")
                            .from(DiscoveredEvents::Table, DiscoveredEvents::SourceId)
                            .to(EventSources::Table, EventSources::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (status, start_time) - public listing and moderation queue
        manager
            .create_index(
                Index::create()
                    .name("idx_discovered_events_status_start")
                    .table(DiscoveredEvents::Table)
                    .col(DiscoveredEvents::Status)
                    .col(DiscoveredEvents::StartTime)
                    .to_owned(),
            )
            .await?;

        // Unique index: (source_id, external_id) - ingest de-duplication
        manager
            .create_index(
                Index::create()
                    .name("idx_discovered_events_external_unique")
                    .table(DiscoveredEvents::Table)
                    .col(DiscoveredEvents::SourceId)
                    .col(DiscoveredEvents::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscoveredEvents::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EventSources::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventSources {
    Table,
    Id,
    Name,
    Url,
    SourceType,
    IsActive,
    LastFetchedAt,
    CreatedAt,
}

#[derive(Iden)]
enum DiscoveredEvents {
    Table,
    Id,
    SourceId,
    ExternalId,
    Title,
    Description,
    StartTime,
    EndTime,
    VenueName,
    Latitude,
    Longitude,
    Status,
    QualityScore,
    SourceUrl,
    IsActive,
    CreatedAt,
    ReviewedAt,
}
