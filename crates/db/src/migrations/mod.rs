//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_places_table;
mod m20250601_000002_create_journeys_tables;
mod m20250601_000003_create_comments_and_ratings;
mod m20250601_000004_create_suggestions_tables;
mod m20250601_000005_create_events_tables;
mod m20250601_000006_create_site_settings_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_places_table::Migration),
            Box::new(m20250601_000002_create_journeys_tables::Migration),
            Box::new(m20250601_000003_create_comments_and_ratings::Migration),
            Box::new(m20250601_000004_create_suggestions_tables::Migration),
            Box::new(m20250601_000005_create_events_tables::Migration),
            Box::new(m20250601_000006_create_site_settings_table::Migration),
        ]
    }
}
