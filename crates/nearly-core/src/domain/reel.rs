use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Counted, Counter, Likeable, Record, optional_text};
use crate::error::DomainError;

/// Short vertical video published to the reels feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_id: Uuid,
    pub caption: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Reel {
    pub fn new(user_id: Uuid, media_id: Uuid, caption: Option<String>) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            media_id,
            caption: optional_text("caption", caption, 500)?,
            likes_count: 0,
            comments_count: 0,
            views_count: 0,
            created_at: Utc::now(),
        })
    }
}

impl Likeable for Reel {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn likes_count(&self) -> i64 {
        self.likes_count
    }
}

impl Counted for Reel {
    fn counter_mut(&mut self, counter: Counter) -> Option<&mut i64> {
        match counter {
            Counter::Likes => Some(&mut self.likes_count),
            Counter::Comments => Some(&mut self.comments_count),
            Counter::Views => Some(&mut self.views_count),
            _ => None,
        }
    }
}

impl Record for Reel {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
