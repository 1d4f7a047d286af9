use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Activity;
use nearly_core::error::RepoError;

use super::parse_column;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub location: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Activity {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            kind: parse_column("activities.kind", &model.kind)?,
            title: model.title,
            body: model.body,
            location: model.location,
            likes_count: model.likes_count,
            comments_count: model.comments_count,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<Activity> for ActiveModel {
    fn from(a: Activity) -> Self {
        Self {
            id: Set(a.id),
            user_id: Set(a.user_id),
            kind: Set(a.kind.as_str().to_string()),
            title: Set(a.title),
            body: Set(a.body),
            location: Set(a.location),
            likes_count: Set(a.likes_count),
            comments_count: Set(a.comments_count),
            created_at: Set(a.created_at.into()),
            updated_at: Set(a.updated_at.into()),
        }
    }
}
