//! Event source entity.

use sea_orm::entity::prelude::*;

/// A feed the event fetch job reads from.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub url: String,

    /// Feed kind, e.g. `"ical"`, `"rss"`, `"api"`.
    pub source_type: String,

    pub is_active: bool,

    pub last_fetched_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::discovered_event::Entity")]
    Events,
}

impl Related<super::discovered_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
