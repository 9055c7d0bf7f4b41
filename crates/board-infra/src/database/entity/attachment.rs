//! Attachment entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use board_core::domain::{Attachment, PathDescriptor};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub post_id: i64,
    pub group_name: String,
    #[sea_orm(unique)]
    pub stored_path: String,
    pub original_name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Attachment.
impl From<Model> for Attachment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            path: PathDescriptor {
                group_name: model.group_name,
                stored_path: model.stored_path,
                original_name: model.original_name,
            },
            created_at: model.created_at.into(),
        }
    }
}

impl ActiveModel {
    /// A new attachment row for `post_id`. The id is left to the database.
    pub fn for_post(post_id: i64, path: PathDescriptor) -> Self {
        Self {
            post_id: Set(post_id),
            group_name: Set(path.group_name),
            stored_path: Set(path.stored_path),
            original_name: Set(path.original_name),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
    }
}
