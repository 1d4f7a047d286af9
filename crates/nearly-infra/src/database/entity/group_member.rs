use sea_orm::Set;
use sea_orm::entity::prelude::*;

use nearly_core::domain::GroupMember;
use nearly_core::error::RepoError;

use super::parse_column;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for GroupMember {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            user_id: model.user_id,
            role: parse_column("group_members.role", &model.role)?,
            joined_at: model.joined_at.into(),
        })
    }
}

impl From<GroupMember> for ActiveModel {
    fn from(m: GroupMember) -> Self {
        Self {
            id: Set(m.id),
            group_id: Set(m.group_id),
            user_id: Set(m.user_id),
            role: Set(m.role.as_str().to_string()),
            joined_at: Set(m.joined_at.into()),
        }
    }
}
