use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Engagement;
use nearly_core::error::RepoError;

use super::parse_column;

/// Unique on (user_id, target_kind, target_id, action); see the migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "engagements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_kind: String,
    pub target_id: Uuid,
    pub action: String,
    pub choice: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Engagement {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            target_kind: parse_column("engagements.target_kind", &model.target_kind)?,
            target_id: model.target_id,
            action: parse_column("engagements.action", &model.action)?,
            choice: model.choice,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Engagement> for ActiveModel {
    fn from(e: Engagement) -> Self {
        Self {
            id: Set(e.id),
            user_id: Set(e.user_id),
            target_kind: Set(e.target_kind.as_str().to_string()),
            target_id: Set(e.target_id),
            action: Set(e.action.as_str().to_string()),
            choice: Set(e.choice),
            created_at: Set(e.created_at.into()),
        }
    }
}
