use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentKind, Record};
use crate::error::DomainError;

/// What a user did to a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementAction {
    Like,
    Vote,
    Save,
}

impl EngagementAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementAction::Like => "like",
            EngagementAction::Vote => "vote",
            EngagementAction::Save => "save",
        }
    }
}

impl fmt::Display for EngagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngagementAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(EngagementAction::Like),
            "vote" => Ok(EngagementAction::Vote),
            "save" => Ok(EngagementAction::Save),
            other => Err(DomainError::validation(format!(
                "unknown engagement action '{other}'"
            ))),
        }
    }
}

/// Server-side record of a like, vote or save.
///
/// At most one row exists per (user, target_kind, target_id, action).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engagement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_kind: ContentKind,
    pub target_id: Uuid,
    pub action: EngagementAction,
    /// Poll option chosen, for votes.
    pub choice: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Engagement {
    pub fn new(
        user_id: Uuid,
        target_kind: ContentKind,
        target_id: Uuid,
        action: EngagementAction,
        choice: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            target_kind,
            target_id,
            action,
            choice,
            created_at: Utc::now(),
        }
    }
}

impl Record for Engagement {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
