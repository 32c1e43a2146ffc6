//! Rating entity.

use sea_orm::entity::prelude::*;

use super::kinds::EntityType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub entity_type: EntityType,

    pub entity_id: String,

    /// 1.0 to 5.0 in steps of 0.1.
    pub rating: f64,

    pub submitter_ip: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
