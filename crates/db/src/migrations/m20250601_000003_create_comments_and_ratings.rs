//! Create comments and ratings tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Comments::EntityType).string_len(16).not_null())
                    .col(ColumnDef::new(Comments::EntityId).string_len(36).not_null())
                    .col(ColumnDef::new(Comments::ParentId).string_len(36))
                    .col(ColumnDef::new(Comments::AuthorName).string_len(100).not_null())
                    .col(ColumnDef::new(Comments::AuthorEmail).string_len(254))
                    .col(ColumnDef::new(Comments::Content).string_len(1000).not_null())
                    .col(ColumnDef::new(Comments::IsApproved).boolean().not_null().default(true))
                    .col(ColumnDef::new(Comments::SubmitterIp).string_len(64))
                    .col(
                        ColumnDef::new(Comments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_parent")
                            .from(Comments::Table, Comments::ParentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (entity_type, entity_id) - listing comments of one entity
        manager
            .create_index(
                Index::create()
                    .name("idx_comments_entity")
                    .table(Comments::Table)
                    .col(Comments::EntityType)
                    .col(Comments::EntityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ratings::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Ratings::EntityType).string_len(16).not_null())
                    .col(ColumnDef::new(Ratings::EntityId).string_len(36).not_null())
                    .col(ColumnDef::new(Ratings::Rating).double().not_null())
                    .col(ColumnDef::new(Ratings::SubmitterIp).string_len(64))
                    .col(
                        ColumnDef::new(Ratings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::cust("rating >= 1.0 AND rating <= 5.0"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_entity")
                    .table(Ratings::Table)
                    .col(Ratings::EntityType)
                    .col(Ratings::EntityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    EntityType,
    EntityId,
    ParentId,
    AuthorName,
    AuthorEmail,
    Content,
    IsApproved,
    SubmitterIp,
    CreatedAt,
}

#[derive(Iden)]
enum Ratings {
    Table,
    Id,
    EntityType,
    EntityId,
    Rating,
    SubmitterIp,
    CreatedAt,
}
