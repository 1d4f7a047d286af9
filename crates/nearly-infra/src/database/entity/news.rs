use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::News;
use nearly_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "news")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub category: String,
    pub image_url: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for News {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            body: model.body,
            category: model.category,
            image_url: model.image_url,
            likes_count: model.likes_count,
            comments_count: model.comments_count,
            created_at: model.created_at.into(),
        })
    }
}

impl From<News> for ActiveModel {
    fn from(n: News) -> Self {
        Self {
            id: Set(n.id),
            author_id: Set(n.author_id),
            title: Set(n.title),
            body: Set(n.body),
            category: Set(n.category),
            image_url: Set(n.image_url),
            likes_count: Set(n.likes_count),
            comments_count: Set(n.comments_count),
            created_at: Set(n.created_at.into()),
        }
    }
}
