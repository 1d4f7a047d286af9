use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Comment;
use nearly_core::error::RepoError;

use super::parse_column;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub target_kind: String,
    pub target_id: Uuid,
    pub user_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub likes_count: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Comment {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            target_kind: parse_column("comments.target_kind", &model.target_kind)?,
            target_id: model.target_id,
            user_id: model.user_id,
            parent_comment_id: model.parent_comment_id,
            body: model.body,
            likes_count: model.likes_count,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Comment> for ActiveModel {
    fn from(c: Comment) -> Self {
        Self {
            id: Set(c.id),
            target_kind: Set(c.target_kind.as_str().to_string()),
            target_id: Set(c.target_id),
            user_id: Set(c.user_id),
            parent_comment_id: Set(c.parent_comment_id),
            body: Set(c.body),
            likes_count: Set(c.likes_count),
            created_at: Set(c.created_at.into()),
        }
    }
}
