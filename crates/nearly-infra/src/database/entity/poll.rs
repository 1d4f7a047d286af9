use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Poll;
use nearly_core::error::RepoError;

use super::{from_json, to_json};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "polls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub question: String,
    /// Ordered `[{id, label, votes}]`.
    pub options: Json,
    pub total_votes: i64,
    pub closes_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Poll {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            author_id: model.author_id,
            question: model.question,
            options: from_json("polls.options", model.options)?,
            total_votes: model.total_votes,
            closes_at: model.closes_at.map(Into::into),
            created_at: model.created_at.into(),
        })
    }
}

impl From<Poll> for ActiveModel {
    fn from(p: Poll) -> Self {
        Self {
            id: Set(p.id),
            author_id: Set(p.author_id),
            question: Set(p.question),
            options: Set(to_json(&p.options)),
            total_votes: Set(p.total_votes),
            closes_at: Set(p.closes_at.map(Into::into)),
            created_at: Set(p.created_at.into()),
        }
    }
}
