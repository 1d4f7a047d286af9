use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentKind, Record};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    Rsvp,
    GroupJoin,
    Message,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Rsvp => "rsvp",
            NotificationKind::GroupJoin => "group_join",
            NotificationKind::Message => "message",
            NotificationKind::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(NotificationKind::Like),
            "comment" => Ok(NotificationKind::Comment),
            "rsvp" => Ok(NotificationKind::Rsvp),
            "group_join" => Ok(NotificationKind::GroupJoin),
            "message" => Ok(NotificationKind::Message),
            "system" => Ok(NotificationKind::System),
            other => Err(DomainError::validation(format!(
                "unknown notification kind '{other}'"
            ))),
        }
    }
}

/// Notification shown in a user's notification list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: Option<String>,
    pub target_kind: Option<ContentKind>,
    pub target_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            body: None,
            target_kind: None,
            target_id: None,
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_target(mut self, kind: ContentKind, id: Uuid) -> Self {
        self.target_kind = Some(kind);
        self.target_id = Some(id);
        self
    }

    /// Notify `recipient` about something `actor` did, unless they are the same person.
    pub fn for_actor(
        recipient: Uuid,
        actor: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
    ) -> Option<Self> {
        (recipient != actor).then(|| Self::new(recipient, kind, title))
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }
}

impl Record for Notification {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_notification_for_own_action() {
        let me = Uuid::new_v4();
        assert!(Notification::for_actor(me, me, NotificationKind::Like, "liked").is_none());

        let other = Uuid::new_v4();
        let n = Notification::for_actor(other, me, NotificationKind::Like, "liked")
            .unwrap()
            .with_target(ContentKind::Reel, Uuid::nil());
        assert_eq!(n.user_id, other);
        assert_eq!(n.target_kind, Some(ContentKind::Reel));
        assert!(!n.read);
    }
}
