use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Counted, Counter, Likeable, Record, optional_text, required_text};
use crate::error::DomainError;

/// What sort of feed post an activity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Activity,
    Question,
    Discussion,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Activity => "activity",
            ActivityKind::Question => "question",
            ActivityKind::Discussion => "discussion",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activity" => Ok(ActivityKind::Activity),
            "question" => Ok(ActivityKind::Question),
            "discussion" => Ok(ActivityKind::Discussion),
            other => Err(DomainError::validation(format!(
                "unknown activity kind '{other}'"
            ))),
        }
    }
}

/// Activity entity - a post in the neighbourhood feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: ActivityKind,
    pub title: String,
    pub body: String,
    pub location: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(
        user_id: Uuid,
        kind: ActivityKind,
        title: &str,
        body: &str,
        location: Option<String>,
    ) -> Result<Self, DomainError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: required_text("title", title, 200)?,
            body: body.trim().to_string(),
            location: optional_text("location", location, 120)?,
            likes_count: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

}

impl Likeable for Activity {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn likes_count(&self) -> i64 {
        self.likes_count
    }
}

impl Counted for Activity {
    fn counter_mut(&mut self, counter: Counter) -> Option<&mut i64> {
        match counter {
            Counter::Likes => Some(&mut self.likes_count),
            Counter::Comments => Some(&mut self.comments_count),
            _ => None,
        }
    }
}

impl Record for Activity {
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
    fn test_like_counter_never_negative() {
        let mut activity =
            Activity::new(Uuid::new_v4(), ActivityKind::Question, "Lost cat?", "", None).unwrap();
        activity.bump(Counter::Likes, -1, None).unwrap();
        assert_eq!(activity.likes_count, 0);
        activity.bump(Counter::Likes, 1, None).unwrap();
        activity.bump(Counter::Likes, 1, None).unwrap();
        activity.bump(Counter::Likes, -1, None).unwrap();
        assert_eq!(activity.likes_count, 1);
        assert!(activity.bump(Counter::Views, 1, None).is_err());
    }

    #[test]
    fn test_blank_title_rejected() {
        let result = Activity::new(Uuid::new_v4(), ActivityKind::Activity, "  ", "body", None);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
