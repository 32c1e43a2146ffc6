//! Community place suggestion entity.

use sea_orm::entity::prelude::*;

use super::kinds::ModerationStatus;

/// A place proposed by a visitor, awaiting moderation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "community_place_suggestions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub place_name: String,

    pub description: Option<String>,

    pub category: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub submitter_email: String,

    pub submitter_name: Option<String>,

    pub status: ModerationStatus,

    /// Denormalized count of rows in `suggestion_votes`.
    pub votes: i32,

    pub admin_notes: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub reviewed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::suggestion_vote::Entity")]
    Votes,
}

impl Related<super::suggestion_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
