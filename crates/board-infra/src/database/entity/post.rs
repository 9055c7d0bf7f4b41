//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use board_core::domain::{NewPost, Post};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub author_id: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::AuthorId",
        to = "super::member::Column::UserId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Member,
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachment,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build the domain aggregate from a post row and its attachment rows.
    pub fn into_domain(self, attachments: Vec<super::attachment::Model>) -> Post {
        Post {
            id: self.id,
            title: self.title,
            body: self.body,
            author_id: self.author_id,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            attachments: attachments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Conversion from a new Domain Post to SeaORM ActiveModel. The id is left to the database.
impl From<&NewPost> for ActiveModel {
    fn from(post: &NewPost) -> Self {
        let now = chrono::Utc::now();
        Self {
            title: Set(post.title.clone()),
            body: Set(post.body.clone()),
            author_id: Set(post.author_id.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
    }
}
