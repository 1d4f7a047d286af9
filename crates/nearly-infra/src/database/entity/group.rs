use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::Group;
use nearly_core::error::RepoError;

use super::parse_column;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub privacy: String,
    pub members_count: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Group {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            privacy: parse_column("groups.privacy", &model.privacy)?,
            members_count: model.members_count,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Group> for ActiveModel {
    fn from(g: Group) -> Self {
        Self {
            id: Set(g.id),
            owner_id: Set(g.owner_id),
            name: Set(g.name),
            description: Set(g.description),
            privacy: Set(g.privacy.as_str().to_string()),
            members_count: Set(g.members_count),
            created_at: Set(g.created_at.into()),
        }
    }
}
