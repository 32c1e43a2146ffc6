//! Journey entity - a curated walk through several places.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "journeys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub title: String,

    pub description: Option<String>,

    /// Vibe tags (JSON array of strings).
    pub mood_tags: Json,

    pub estimated_duration_minutes: i32,

    pub estimated_distance_meters: i32,

    pub ideal_conditions: Json,

    pub acceptable_conditions: Json,

    pub avoid_conditions: Json,

    pub is_published: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journey_stop::Entity")]
    Stops,
}

impl Related<super::journey_stop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stops.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
