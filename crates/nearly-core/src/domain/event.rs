use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Counted, Counter, Record, decrement, optional_text, required_text};
use crate::error::DomainError;

/// Event entity - a local meetup with an RSVP list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i64>,
    pub guests_count: i64,
    pub comments_count: i64,
    pub created_at: DateTime<Utc>,
}

/// RSVP answer of a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestStatus {
    Going,
    Interested,
    Declined,
}

impl GuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestStatus::Going => "going",
            GuestStatus::Interested => "interested",
            GuestStatus::Declined => "declined",
        }
    }
}

impl GuestStatus {
    /// Change in the "going" headcount when an RSVP moves from `previous`
    /// to `next`: `1`, `-1` or `0`.
    pub fn seat_delta(previous: Option<GuestStatus>, next: GuestStatus) -> i64 {
        let was_going = previous == Some(GuestStatus::Going);
        let is_going = next == GuestStatus::Going;
        i64::from(is_going) - i64::from(was_going)
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "going" => Ok(GuestStatus::Going),
            "interested" => Ok(GuestStatus::Interested),
            "declined" => Ok(GuestStatus::Declined),
            other => Err(DomainError::validation(format!(
                "unknown guest status '{other}'"
            ))),
        }
    }
}

/// One guest row per (event, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventGuest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: GuestStatus,
    pub created_at: DateTime<Utc>,
}

impl EventGuest {
    pub fn new(event_id: Uuid, user_id: Uuid, status: GuestStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status,
            created_at: Utc::now(),
        }
    }
}

impl Event {
    pub fn new(
        host_id: Uuid,
        title: &str,
        description: &str,
        location: Option<String>,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        capacity: Option<i64>,
    ) -> Result<Self, DomainError> {
        if let Some(end) = ends_at {
            if end <= starts_at {
                return Err(DomainError::validation("event must end after it starts"));
            }
        }
        if matches!(capacity, Some(c) if c < 1) {
            return Err(DomainError::validation("capacity must be at least 1"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            host_id,
            title: required_text("title", title, 200)?,
            description: description.trim().to_string(),
            location: optional_text("location", location, 120)?,
            starts_at,
            ends_at,
            capacity,
            guests_count: 0,
            comments_count: 0,
            created_at: Utc::now(),
        })
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|c| self.guests_count >= c)
    }

    /// Update the "going" counter for an RSVP change.
    ///
    /// `guests_count` only counts guests who are going.
    pub fn apply_rsvp(
        &mut self,
        previous: Option<GuestStatus>,
        next: GuestStatus,
    ) -> Result<(), DomainError> {
        match GuestStatus::seat_delta(previous, next) {
            1 => {
                if self.is_full() {
                    return Err(DomainError::Forbidden("event is full".to_string()));
                }
                self.guests_count += 1;
            }
            -1 => self.guests_count = decrement(self.guests_count),
            _ => {}
        }
        Ok(())
    }
}

impl Counted for Event {
    fn counter_mut(&mut self, counter: Counter) -> Option<&mut i64> {
        match counter {
            Counter::Guests => Some(&mut self.guests_count),
            Counter::Comments => Some(&mut self.comments_count),
            _ => None,
        }
    }
}

impl Record for Event {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for EventGuest {
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
    use chrono::Duration;

    fn event(capacity: Option<i64>) -> Event {
        let start = Utc::now() + Duration::days(1);
        Event::new(
            Uuid::new_v4(),
            "Street party",
            "Bring food",
            Some("Elm St".into()),
            start,
            Some(start + Duration::hours(3)),
            capacity,
        )
        .unwrap()
    }

    #[test]
    fn test_end_before_start_rejected() {
        let start = Utc::now();
        let result = Event::new(Uuid::new_v4(), "x", "", None, start, Some(start), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_rsvp_counts_only_going() {
        let mut event = event(None);
        event.apply_rsvp(None, GuestStatus::Interested).unwrap();
        assert_eq!(event.guests_count, 0);
        event
            .apply_rsvp(Some(GuestStatus::Interested), GuestStatus::Going)
            .unwrap();
        assert_eq!(event.guests_count, 1);
        event
            .apply_rsvp(Some(GuestStatus::Going), GuestStatus::Going)
            .unwrap();
        assert_eq!(event.guests_count, 1);
        event
            .apply_rsvp(Some(GuestStatus::Going), GuestStatus::Declined)
            .unwrap();
        assert_eq!(event.guests_count, 0);
    }

    #[test]
    fn test_full_event_rejects_new_going_guest() {
        let mut event = event(Some(1));
        event.apply_rsvp(None, GuestStatus::Going).unwrap();
        assert!(event.is_full());
        let result = event.apply_rsvp(None, GuestStatus::Going);
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
        // declining is still allowed
        event
            .apply_rsvp(Some(GuestStatus::Going), GuestStatus::Declined)
            .unwrap();
        assert!(!event.is_full());
    }

    #[test]
    fn test_seat_delta_follows_going_transitions() {
        use GuestStatus::*;
        assert_eq!(GuestStatus::seat_delta(None, Going), 1);
        assert_eq!(GuestStatus::seat_delta(Some(Interested), Going), 1);
        assert_eq!(GuestStatus::seat_delta(Some(Going), Going), 0);
        assert_eq!(GuestStatus::seat_delta(Some(Going), Declined), -1);
        assert_eq!(GuestStatus::seat_delta(None, Declined), 0);
    }
}
