use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Notification;
use nearly_core::error::RepoError;

use super::parse_column;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    pub target_kind: Option<String>,
    pub target_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Notification {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            kind: parse_column("notifications.kind", &model.kind)?,
            title: model.title,
            body: model.body,
            target_kind: model
                .target_kind
                .as_deref()
                .map(|k| parse_column("notifications.target_kind", k))
                .transpose()?,
            target_id: model.target_id,
            read: model.read,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Notification> for ActiveModel {
    fn from(n: Notification) -> Self {
        Self {
            id: Set(n.id),
            user_id: Set(n.user_id),
            kind: Set(n.kind.as_str().to_string()),
            title: Set(n.title),
            body: Set(n.body),
            target_kind: Set(n.target_kind.map(|k| k.as_str().to_string())),
            target_id: Set(n.target_id),
            read: Set(n.read),
            created_at: Set(n.created_at.into()),
        }
    }
}
