//! Discovered event entity.

use sea_orm::entity::prelude::*;

use super::kinds::ModerationStatus;

/// An event found by the scheduled fetch job.
///
/// Rows arrive as `pending`; only `approved` rows that are still active are
/// served publicly.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "discovered_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub source_id: Option<String>,

    /// Identifier of the event at its source, used for de-duplication.
    pub external_id: Option<String>,

    pub title: String,

    pub description: Option<String>,

    pub start_time: DateTimeWithTimeZone,

    pub end_time: DateTimeWithTimeZone,

    pub venue_name: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub status: ModerationStatus,

    /// 0 to 100.
    pub quality_score: i32,

    pub source_url: Option<String>,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub reviewed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event_source::Entity",
        from = "Column::SourceId",
        to = "super::event_source::Column::Id"
    )]
    Source,
}

impl Related<super::event_source::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Source.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
