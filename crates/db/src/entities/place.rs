//! Place entity.

use sea_orm::entity::prelude::*;

/// A curated place in the neighborhood.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    pub category: String,

    pub latitude: f64,

    pub longitude: f64,

    /// 1.0 to 5.0 in steps of 0.1.
    pub rating: Option<f64>,

    pub visited: bool,

    pub photo_url: Option<String>,

    /// Daily opening window, `"HH:MM-HH:MM"`; may wrap past midnight.
    pub opening_hours: Option<String>,

    /// Extra search terms (JSON array of strings).
    pub search_keywords: Option<Json>,

    pub brand_name: Option<String>,

    /// Weather labels this place suits best (JSON array).
    pub ideal_conditions: Json,

    /// Weather labels this place tolerates (JSON array).
    pub acceptable_conditions: Json,

    /// Weather labels to avoid (JSON array).
    pub avoid_conditions: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journey_stop::Entity")]
    JourneyStops,
}

impl Related<super::journey_stop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JourneyStops.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
