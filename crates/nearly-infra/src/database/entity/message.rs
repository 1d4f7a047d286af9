use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Message;
use nearly_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub read: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Message {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            sender_id: model.sender_id,
            recipient_id: model.recipient_id,
            body: model.body,
            read: model.read,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Message> for ActiveModel {
    fn from(m: Message) -> Self {
        Self {
            id: Set(m.id),
            sender_id: Set(m.sender_id),
            recipient_id: Set(m.recipient_id),
            body: Set(m.body),
            read: Set(m.read),
            created_at: Set(m.created_at.into()),
        }
    }
}
