//! Create community_place_suggestions and suggestion_votes tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommunityPlaceSuggestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommunityPlaceSuggestions::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CommunityPlaceSuggestions::PlaceName)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommunityPlaceSuggestions::Description).text())
                    .col(ColumnDef::new(CommunityPlaceSuggestions::Category).string_len(64))
                    .col(ColumnDef::new(CommunityPlaceSuggestions::Latitude).double())
                    .col(ColumnDef::new(CommunityPlaceSuggestions::Longitude).double())
                    .col(
                        ColumnDef::new(CommunityPlaceSuggestions::SubmitterEmail)
                            .string_len(254)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommunityPlaceSuggestions::SubmitterName).string_len(100))
                    .col(
                        ColumnDef::new(CommunityPlaceSuggestions::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(CommunityPlaceSuggestions::Votes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CommunityPlaceSuggestions::AdminNotes).text())
                    .col(
                        ColumnDef::new(CommunityPlaceSuggestions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CommunityPlaceSuggestions::ReviewedAt)
                            .timestamp_with_time_zone(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: status (moderation queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_suggestions_status")
                    .table(CommunityPlaceSuggestions::Table)
                    .col(CommunityPlaceSuggestions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SuggestionVotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SuggestionVotes::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(SuggestionVotes::SuggestionId).string_len(36).not_null())
                    .col(ColumnDef::new(SuggestionVotes::VoterKey).string_len(254).not_null())
                    .col(
                        ColumnDef::new(SuggestionVotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_suggestion_votes_suggestion")
                            .from(SuggestionVotes::Table, SuggestionVotes::SuggestionId)
                            .to(CommunityPlaceSuggestions::Table, CommunityPlaceSuggestions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one vote per voter per suggestion
        manager
            .create_index(
                Index::create()
                    .name("idx_suggestion_votes_unique")
                    .table(SuggestionVotes::Table)
                    .col(SuggestionVotes::SuggestionId)
                    .col(SuggestionVotes::VoterKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SuggestionVotes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CommunityPlaceSuggestions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CommunityPlaceSuggestions {
    Table,
    Id,
    PlaceName,
    Description,
    Category,
    Latitude,
    Longitude,
    SubmitterEmail,
    SubmitterName,
    Status,
    Votes,
    AdminNotes,
    CreatedAt,
    ReviewedAt,
}

#[derive(Iden)]
enum SuggestionVotes {
    Table,
    Id,
    SuggestionId,
    VoterKey,
    CreatedAt,
}
