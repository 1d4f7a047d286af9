use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Counted, Counter, Likeable, Record, optional_text, required_text};
use crate::error::DomainError;

/// Local news article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub category: String,
    pub image_url: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
}

impl News {
    pub fn new(
        author_id: Uuid,
        title: &str,
        body: &str,
        category: &str,
        image_url: Option<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            author_id,
            title: required_text("title", title, 200)?,
            body: required_text("body", body, 20_000)?,
            category: required_text("category", category, 40)?.to_lowercase(),
            image_url: optional_text("image_url", image_url, 2048)?,
            likes_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
        })
    }

}

impl Likeable for News {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }

    fn likes_count(&self) -> i64 {
        self.likes_count
    }
}

impl Counted for News {
    fn counter_mut(&mut self, counter: Counter) -> Option<&mut i64> {
        match counter {
            Counter::Likes => Some(&mut self.likes_count),
            Counter::Comments => Some(&mut self.comments_count),
            _ => None,
        }
    }
}

impl Record for News {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
