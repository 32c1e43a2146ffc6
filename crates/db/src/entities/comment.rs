//! Comment entity.

use sea_orm::entity::prelude::*;

use super::kinds::EntityType;

/// A comment on a place, journey or event.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub entity_type: EntityType,

    pub entity_id: String,

    /// Parent comment for replies. Replies are only one level deep.
    pub parent_id: Option<String>,

    pub author_name: String,

    pub author_email: Option<String>,

    /// Sanitized text, at most 1000 characters.
    pub content: String,

    /// Hidden comments are kept for moderation but never listed publicly.
    pub is_approved: bool,

    pub submitter_ip: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
    Parent,
}

impl ActiveModelBehavior for ActiveModel {}
