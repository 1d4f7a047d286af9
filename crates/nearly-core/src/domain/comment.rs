use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentKind, Counted, Counter, Likeable, Record, required_text};
use crate::error::DomainError;

/// Comment on any piece of content, optionally replying to another comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub target_kind: ContentKind,
    pub target_id: Uuid,
    pub user_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub body: String,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        target_kind: ContentKind,
        target_id: Uuid,
        user_id: Uuid,
        parent_comment_id: Option<Uuid>,
        body: &str,
    ) -> Result<Self, DomainError> {
        if target_kind == ContentKind::Comment {
            return Err(DomainError::validation(
                "reply through parent_comment_id instead of commenting on a comment",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            target_kind,
            target_id,
            user_id,
            parent_comment_id,
            body: required_text("body", body, 2000)?,
            likes_count: 0,
            created_at: Utc::now(),
        })
    }

    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}

impl Likeable for Comment {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn likes_count(&self) -> i64 {
        self.likes_count
    }
}

impl Counted for Comment {
    fn counter_mut(&mut self, counter: Counter) -> Option<&mut i64> {
        match counter {
            Counter::Likes => Some(&mut self.likes_count),
            _ => None,
        }
    }
}

impl Record for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
