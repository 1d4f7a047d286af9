use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::EventGuest;
use nearly_core::error::RepoError;

use super::parse_column;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "event_guests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for EventGuest {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            event_id: model.event_id,
            user_id: model.user_id,
            status: parse_column("event_guests.status", &model.status)?,
            created_at: model.created_at.into(),
        })
    }
}

impl From<EventGuest> for ActiveModel {
    fn from(g: EventGuest) -> Self {
        Self {
            id: Set(g.id),
            event_id: Set(g.event_id),
            user_id: Set(g.user_id),
            status: Set(g.status.as_str().to_string()),
            created_at: Set(g.created_at.into()),
        }
    }
}
