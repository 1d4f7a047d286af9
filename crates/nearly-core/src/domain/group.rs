use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Counted, Counter, Record, required_text};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPrivacy {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

impl GroupPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupPrivacy::Public => "public",
            GroupPrivacy::Private => "private",
        }
    }
}

impl fmt::Display for GroupPrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupPrivacy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(GroupPrivacy::Public),
            "private" => Ok(GroupPrivacy::Private),
            other => Err(DomainError::validation(format!(
                "unknown group privacy '{other}'"
            ))),
        }
    }
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MemberRole::Owner),
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            other => Err(DomainError::validation(format!(
                "unknown member role '{other}'"
            ))),
        }
    }
}

/// Group entity - a neighbourhood community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
    pub members_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Membership row, one per (group, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl Group {
    /// Create a group. The owner is its first member, so the counter starts at one.
    pub fn new(
        owner_id: Uuid,
        name: &str,
        description: &str,
        privacy: GroupPrivacy,
    ) -> Result<(Self, GroupMember), DomainError> {
        let group = Self {
            id: Uuid::new_v4(),
            owner_id,
            name: required_text("name", name, 80)?,
            description: description.trim().to_string(),
            privacy,
            members_count: 1,
            created_at: Utc::now(),
        };
        let owner = GroupMember::new(group.id, owner_id, MemberRole::Owner);
        Ok((group, owner))
    }
}

impl GroupMember {
    pub fn new(group_id: Uuid, user_id: Uuid, role: MemberRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }

    /// Owners cannot walk away from their own group.
    pub fn can_leave(&self) -> bool {
        self.role != MemberRole::Owner
    }
}

impl Counted for Group {
    fn counter_mut(&mut self, counter: Counter) -> Option<&mut i64> {
        match counter {
            Counter::Members => Some(&mut self.members_count),
            _ => None,
        }
    }
}

impl Record for Group {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for GroupMember {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_first_member() {
        let owner = Uuid::new_v4();
        let (mut group, member) =
            Group::new(owner, "Gardeners", "", GroupPrivacy::Public).unwrap();
        assert_eq!(group.members_count, 1);
        assert_eq!(member.user_id, owner);
        assert!(!member.can_leave());

        assert_eq!(group.bump(Counter::Members, 1, None).unwrap(), Some(2));
        for _ in 0..3 {
            group.bump(Counter::Members, -1, None).unwrap();
        }
        assert_eq!(group.members_count, 0);
    }
}
