use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, required_text};
use crate::error::DomainError;

pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Uuid,
    pub label: String,
    pub votes: i64,
}

/// Per-option tally with its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResult {
    pub option_id: Uuid,
    pub label: String,
    pub votes: i64,
    pub percentage: f64,
}

/// Neighbourhood poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub author_id: Uuid,
    pub question: String,
    pub options: Vec<PollOption>,
    pub total_votes: i64,
    pub closes_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    pub fn new(
        author_id: Uuid,
        question: &str,
        labels: &[String],
        closes_at: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        if !(MIN_POLL_OPTIONS..=MAX_POLL_OPTIONS).contains(&labels.len()) {
            return Err(DomainError::validation(format!(
                "a poll needs {MIN_POLL_OPTIONS} to {MAX_POLL_OPTIONS} options"
            )));
        }

        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(labels.len());
        for label in labels {
            let label = required_text("option", label, 100)?;
            if !seen.insert(label.to_lowercase()) {
                return Err(DomainError::validation(format!(
                    "duplicate poll option '{label}'"
                )));
            }
            options.push(PollOption {
                id: Uuid::new_v4(),
                label,
                votes: 0,
            });
        }

        let now = Utc::now();
        if matches!(closes_at, Some(c) if c <= now) {
            return Err(DomainError::validation("closing time must be in the future"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            author_id,
            question: required_text("question", question, 300)?,
            options,
            total_votes: 0,
            closes_at,
            created_at: now,
        })
    }

    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.closes_at.is_some_and(|c| now >= c)
    }

    /// Tally one vote. Duplicate-vote protection lives with the engagement records.
    pub fn cast_vote(&mut self, option_id: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_closed(now) {
            return Err(DomainError::InvalidTransition("poll is closed".to_string()));
        }
        let option = self
            .options
            .iter_mut()
            .find(|o| o.id == option_id)
            .ok_or_else(|| DomainError::validation("unknown poll option"))?;
        option.votes += 1;
        self.total_votes += 1;
        Ok(())
    }

    /// Percentages rounded to one decimal; all zero before the first vote.
    pub fn results(&self) -> Vec<PollResult> {
        self.options
            .iter()
            .map(|o| PollResult {
                option_id: o.id,
                label: o.label.clone(),
                votes: o.votes,
                percentage: if self.total_votes > 0 {
                    (o.votes as f64 * 1000.0 / self.total_votes as f64).round() / 10.0
                } else {
                    0.0
                },
            })
            .collect()
    }
}

impl Record for Poll {
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

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_option_count_and_duplicates_validated() {
        let author = Uuid::new_v4();
        assert!(Poll::new(author, "Q?", &labels(&["only"]), None).is_err());
        assert!(Poll::new(author, "Q?", &labels(&["Yes", "yes"]), None).is_err());
        assert!(Poll::new(author, "Q?", &labels(&["Yes", "No"]), None).is_ok());
    }

    #[test]
    fn test_results_percentages() {
        let mut poll = Poll::new(Uuid::new_v4(), "Park day?", &labels(&["Sat", "Sun", "Mon"]), None)
            .unwrap();
        assert!(poll.results().iter().all(|r| r.percentage == 0.0));

        let now = Utc::now();
        let sat = poll.options[0].id;
        let sun = poll.options[1].id;
        poll.cast_vote(sat, now).unwrap();
        poll.cast_vote(sat, now).unwrap();
        poll.cast_vote(sun, now).unwrap();

        let results = poll.results();
        assert_eq!(poll.total_votes, 3);
        assert_eq!(results[0].percentage, 66.7);
        assert_eq!(results[1].percentage, 33.3);
        assert_eq!(results[2].percentage, 0.0);
    }

    #[test]
    fn test_closed_poll_and_unknown_option_rejected() {
        let closes = Utc::now() + Duration::hours(1);
        let mut poll =
            Poll::new(Uuid::new_v4(), "Q?", &labels(&["A", "B"]), Some(closes)).unwrap();
        assert!(poll.cast_vote(Uuid::new_v4(), Utc::now()).is_err());

        let a = poll.options[0].id;
        let result = poll.cast_vote(a, closes + Duration::seconds(1));
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
        assert_eq!(poll.total_votes, 0);
    }
}
