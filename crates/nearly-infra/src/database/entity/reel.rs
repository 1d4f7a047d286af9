use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Reel;
use nearly_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_id: Uuid,
    pub caption: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub views_count: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Reel {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            media_id: model.media_id,
            caption: model.caption,
            likes_count: model.likes_count,
            comments_count: model.comments_count,
            views_count: model.views_count,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Reel> for ActiveModel {
    fn from(r: Reel) -> Self {
        Self {
            id: Set(r.id),
            user_id: Set(r.user_id),
            media_id: Set(r.media_id),
            caption: Set(r.caption),
            likes_count: Set(r.likes_count),
            comments_count: Set(r.comments_count),
            views_count: Set(r.views_count),
            created_at: Set(r.created_at.into()),
        }
    }
}
