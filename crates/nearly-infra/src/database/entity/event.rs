use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Event;
use nearly_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTimeWithTimeZone,
    pub ends_at: Option<DateTimeWithTimeZone>,
    pub capacity: Option<i64>,
    pub guests_count: i64,
    pub comments_count: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Event {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            host_id: model.host_id,
            title: model.title,
            description: model.description,
            location: model.location,
            starts_at: model.starts_at.into(),
            ends_at: model.ends_at.map(Into::into),
            capacity: model.capacity,
            guests_count: model.guests_count,
            comments_count: model.comments_count,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Event> for ActiveModel {
    fn from(e: Event) -> Self {
        Self {
            id: Set(e.id),
            host_id: Set(e.host_id),
            title: Set(e.title),
            description: Set(e.description),
            location: Set(e.location),
            starts_at: Set(e.starts_at.into()),
            ends_at: Set(e.ends_at.map(Into::into)),
            capacity: Set(e.capacity),
            guests_count: Set(e.guests_count),
            comments_count: Set(e.comments_count),
            created_at: Set(e.created_at.into()),
        }
    }
}
