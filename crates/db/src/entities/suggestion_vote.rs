//! Suggestion vote entity.

use sea_orm::entity::prelude::*;

/// One vote per voter per suggestion.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "suggestion_votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub suggestion_id: String,

    /// Client IP or email of the voter.
    pub voter_key: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::community_place_suggestion::Entity",
        from = "Column::SuggestionId",
        to = "super::community_place_suggestion::Column::Id"
    )]
    Suggestion,
}

impl Related<super::community_place_suggestion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suggestion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
