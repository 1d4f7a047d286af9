//! Domain entities - the core business objects.

mod activity;
mod comment;
mod engagement;
mod event;
mod group;
mod media;
mod message;
mod news;
mod notification;
mod poll;
mod reel;
mod user;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub use activity::{Activity, ActivityKind};
pub use comment::Comment;
pub use engagement::{Engagement, EngagementAction};
pub use event::{Event, EventGuest, GuestStatus};
pub use group::{Group, GroupMember, GroupPrivacy, MemberRole};
pub use media::{
    Media, MediaType, Rendition, TranscodeStatus, TranscodeUpdate, UploadStrategy,
    VideoDescriptor,
};
pub use message::Message;
pub use news::News;
pub use notification::{Notification, NotificationKind};
pub use poll::{Poll, PollOption, PollResult};
pub use reel::Reel;
pub use user::{ProfileUpdate, User};

/// Anything stored with a UUID key and a creation time.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Content that carries a like counter.
pub trait Likeable {
    /// User who receives notifications about this content.
    fn owner_id(&self) -> Uuid;

    fn likes_count(&self) -> i64;
}

/// Counters are denormalised and must never go below zero.
pub(crate) fn decrement(count: i64) -> i64 {
    (count - 1).max(0)
}

/// Denormalised counter columns. Storage moves them in place, one request at
/// a time, instead of writing back a whole row read earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Likes,
    Comments,
    Views,
    Guests,
    Members,
}

impl Counter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::Likes => "likes_count",
            Counter::Comments => "comments_count",
            Counter::Views => "views_count",
            Counter::Guests => "guests_count",
            Counter::Members => "members_count",
        }
    }

    /// Whether rows of `kind` carry this counter.
    pub fn applies_to(&self, kind: ContentKind) -> bool {
        match self {
            Counter::Likes => matches!(
                kind,
                ContentKind::Activity | ContentKind::News | ContentKind::Reel | ContentKind::Comment
            ),
            Counter::Comments => matches!(
                kind,
                ContentKind::Activity | ContentKind::Event | ContentKind::News | ContentKind::Reel
            ),
            Counter::Views => kind == ContentKind::Reel,
            Counter::Guests => kind == ContentKind::Event,
            Counter::Members => kind == ContentKind::Group,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row whose counters can be moved in place.
pub trait Counted {
    fn counter_mut(&mut self, counter: Counter) -> Option<&mut i64>;

    /// Add `delta`, flooring at zero. A positive change is refused (`Ok(None)`)
    /// once the counter has reached `cap`.
    fn bump(
        &mut self,
        counter: Counter,
        delta: i64,
        cap: Option<i64>,
    ) -> Result<Option<i64>, DomainError> {
        let value = self
            .counter_mut(counter)
            .ok_or_else(|| DomainError::validation(format!("no {counter} on this row")))?;
        if delta > 0 && cap.is_some_and(|c| *value >= c) {
            return Ok(None);
        }
        *value = value.saturating_add(delta).max(0);
        Ok(Some(*value))
    }
}

/// Kind of content an engagement, comment or notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Activity,
    Event,
    Group,
    News,
    Poll,
    Reel,
    Comment,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Activity => "activity",
            ContentKind::Event => "event",
            ContentKind::Group => "group",
            ContentKind::News => "news",
            ContentKind::Poll => "poll",
            ContentKind::Reel => "reel",
            ContentKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activity" | "activities" => Ok(ContentKind::Activity),
            "event" | "events" => Ok(ContentKind::Event),
            "group" | "groups" => Ok(ContentKind::Group),
            "news" => Ok(ContentKind::News),
            "poll" | "polls" => Ok(ContentKind::Poll),
            "reel" | "reels" => Ok(ContentKind::Reel),
            "comment" | "comments" => Ok(ContentKind::Comment),
            other => Err(DomainError::validation(format!(
                "unknown content kind '{other}'"
            ))),
        }
    }
}

/// Offset pagination used by every list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub const DEFAULT_LIMIT: u64 = 20;
    pub const MAX_LIMIT: u64 = 100;

    /// Build a page from optional query parameters, clamping the limit.
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Trim a required text field and check its length in characters.
pub(crate) fn required_text(
    field: &str,
    value: &str,
    max_chars: usize,
) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`], but empty input becomes `None`.
pub(crate) fn optional_text(
    field: &str,
    value: Option<String>,
    max_chars: usize,
) -> Result<Option<String>, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => required_text(field, &v, max_chars).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_accepts_plural_path_segments() {
        assert_eq!("events".parse::<ContentKind>().unwrap(), ContentKind::Event);
        assert_eq!("news".parse::<ContentKind>().unwrap(), ContentKind::News);
        assert!("pages".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_page_clamps_limit() {
        assert_eq!(Page::new(Some(0), None).limit, 1);
        assert_eq!(Page::new(Some(500), Some(40)), Page { limit: 100, offset: 40 });
        assert_eq!(Page::default().limit, 20);
    }

    #[test]
    fn test_required_text_trims_and_bounds() {
        assert_eq!(required_text("title", "  hi ", 10).unwrap(), "hi");
        assert!(required_text("title", "   ", 10).is_err());
        assert!(required_text("title", "abcdef", 5).is_err());
        assert_eq!(optional_text("bio", Some(" ".into()), 5).unwrap(), None);
    }

    struct Tally(i64);

    impl Counted for Tally {
        fn counter_mut(&mut self, counter: Counter) -> Option<&mut i64> {
            (counter == Counter::Guests).then_some(&mut self.0)
        }
    }

    #[test]
    fn test_bump_floors_at_zero_and_respects_cap() {
        let mut tally = Tally(1);
        assert_eq!(tally.bump(Counter::Guests, -3, None).unwrap(), Some(0));
        assert_eq!(tally.bump(Counter::Guests, 1, Some(1)).unwrap(), Some(1));
        assert_eq!(tally.bump(Counter::Guests, 1, Some(1)).unwrap(), None);
        // leaving a full event is always allowed
        assert_eq!(tally.bump(Counter::Guests, -1, Some(1)).unwrap(), Some(0));
        assert!(tally.bump(Counter::Likes, 1, None).is_err());
    }

    #[test]
    fn test_counters_apply_to_matching_content() {
        assert!(Counter::Likes.applies_to(ContentKind::Comment));
        assert!(!Counter::Likes.applies_to(ContentKind::Poll));
        assert!(Counter::Guests.applies_to(ContentKind::Event));
        assert!(!Counter::Views.applies_to(ContentKind::Activity));
        assert_eq!(Counter::Members.to_string(), "members_count");
    }
}
