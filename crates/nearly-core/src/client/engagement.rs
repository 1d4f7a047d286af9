use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{ContentKind, Engagement, EngagementAction};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngagementKey {
    pub kind: ContentKind,
    pub id: Uuid,
    pub action: EngagementAction,
}

impl EngagementKey {
    pub fn new(kind: ContentKind, id: Uuid, action: EngagementAction) -> Self {
        Self { kind, id, action }
    }
}

/// Snapshot taken before an optimistic update, with the updated counter the
/// UI should show while the request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Optimistic {
    pub key: EngagementKey,
    was_set: bool,
    previous_choice: Option<Uuid>,
    previous_count: i64,
    pub count: i64,
}

impl Optimistic {
    pub fn previous_count(&self) -> i64 {
        self.previous_count
    }

    /// Whether the flag is set after the update.
    pub fn is_set(&self) -> bool {
        !self.was_set
    }
}

/// Likes, saves and votes of the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct EngagementStore {
    flags: HashMap<EngagementKey, Option<Uuid>>,
}

impl EngagementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the server's engagement list after sign-in.
    pub fn hydrate<'a>(&mut self, engagements: impl IntoIterator<Item = &'a Engagement>) {
        for e in engagements {
            self.flags.insert(
                EngagementKey::new(e.target_kind, e.target_id, e.action),
                e.choice,
            );
        }
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }

    pub fn is_set(&self, kind: ContentKind, id: Uuid, action: EngagementAction) -> bool {
        self.flags
            .contains_key(&EngagementKey::new(kind, id, action))
    }

    /// Option the user voted for on a poll.
    pub fn choice(&self, poll_id: Uuid) -> Option<Uuid> {
        self.flags
            .get(&EngagementKey::new(ContentKind::Poll, poll_id, EngagementAction::Vote))
            .copied()
            .flatten()
    }

    pub fn toggle_like(&mut self, kind: ContentKind, id: Uuid, count: i64) -> Optimistic {
        self.toggle(EngagementKey::new(kind, id, EngagementAction::Like), count)
    }

    pub fn toggle_save(&mut self, kind: ContentKind, id: Uuid, count: i64) -> Optimistic {
        self.toggle(EngagementKey::new(kind, id, EngagementAction::Save), count)
    }

    /// Votes are final: a second vote on the same poll is rejected.
    pub fn record_vote(
        &mut self,
        poll_id: Uuid,
        choice: Uuid,
        total_votes: i64,
    ) -> Result<Optimistic, DomainError> {
        let key = EngagementKey::new(ContentKind::Poll, poll_id, EngagementAction::Vote);
        if self.flags.contains_key(&key) {
            return Err(DomainError::Duplicate(format!(
                "already voted on poll {poll_id}"
            )));
        }
        let snapshot = self.begin(key, total_votes);
        self.flags.insert(key, Some(choice));
        Ok(Optimistic {
            count: total_votes.max(0) + 1,
            ..snapshot
        })
    }

    /// Capture the flag and counter for `key` before changing them.
    pub fn begin(&self, key: EngagementKey, count: i64) -> Optimistic {
        let previous = self.flags.get(&key).copied();
        Optimistic {
            key,
            was_set: previous.is_some(),
            previous_choice: previous.flatten(),
            previous_count: count,
            count,
        }
    }

    /// Undo an optimistic update. Returns the counter to display again.
    pub fn rollback(&mut self, snapshot: Optimistic) -> i64 {
        if snapshot.was_set {
            self.flags.insert(snapshot.key, snapshot.previous_choice);
        } else {
            self.flags.remove(&snapshot.key);
        }
        snapshot.previous_count
    }

    fn toggle(&mut self, key: EngagementKey, count: i64) -> Optimistic {
        let snapshot = self.begin(key, count);
        let count = if snapshot.was_set {
            self.flags.remove(&key);
            (count - 1).max(0)
        } else {
            self.flags.insert(key, None);
            count.max(0) + 1
        };
        Optimistic { count, ..snapshot }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_toggles_flag_and_counter() {
        let mut store = EngagementStore::new();
        let id = Uuid::new_v4();

        let liked = store.toggle_like(ContentKind::Reel, id, 4);
        assert_eq!(liked.count, 5);
        assert!(liked.is_set());
        assert!(store.is_set(ContentKind::Reel, id, EngagementAction::Like));

        let unliked = store.toggle_like(ContentKind::Reel, id, liked.count);
        assert_eq!(unliked.count, 4);
        assert!(!unliked.is_set());
        assert!(!store.is_set(ContentKind::Reel, id, EngagementAction::Like));
    }

    #[test]
    fn test_counter_never_negative() {
        let mut store = EngagementStore::new();
        let id = Uuid::new_v4();
        store.toggle_like(ContentKind::News, id, 0);
        let unliked = store.toggle_like(ContentKind::News, id, 0);
        assert_eq!(unliked.count, 0);
    }

    #[test]
    fn test_rollback_restores_flag_and_counter() {
        let mut store = EngagementStore::new();
        let id = Uuid::new_v4();

        let saved = store.toggle_save(ContentKind::Event, id, 2);
        assert_eq!(saved.count, 3);
        assert_eq!(store.rollback(saved), 2);
        assert!(!store.is_set(ContentKind::Event, id, EngagementAction::Save));

        store.toggle_like(ContentKind::Event, id, 0);
        let unliked = store.toggle_like(ContentKind::Event, id, 1);
        assert_eq!(store.rollback(unliked), 1);
        assert!(store.is_set(ContentKind::Event, id, EngagementAction::Like));
    }

    #[test]
    fn test_second_vote_rejected_and_choice_kept() {
        let mut store = EngagementStore::new();
        let poll = Uuid::new_v4();
        let yes = Uuid::new_v4();

        let vote = store.record_vote(poll, yes, 10).unwrap();
        assert_eq!(vote.count, 11);
        assert_eq!(store.choice(poll), Some(yes));

        let again = store.record_vote(poll, Uuid::new_v4(), 11);
        assert!(matches!(again, Err(DomainError::Duplicate(_))));
        assert_eq!(store.choice(poll), Some(yes));

        assert_eq!(store.rollback(vote), 10);
        assert_eq!(store.choice(poll), None);
    }

    #[test]
    fn test_hydrate_from_server_engagements() {
        let user = Uuid::new_v4();
        let poll = Uuid::new_v4();
        let option = Uuid::new_v4();
        let reel = Uuid::new_v4();
        let rows = vec![
            Engagement::new(user, ContentKind::Poll, poll, EngagementAction::Vote, Some(option)),
            Engagement::new(user, ContentKind::Reel, reel, EngagementAction::Like, None),
        ];

        let mut store = EngagementStore::new();
        store.hydrate(&rows);
        assert_eq!(store.choice(poll), Some(option));
        assert!(store.is_set(ContentKind::Reel, reel, EngagementAction::Like));
        assert!(!store.is_set(ContentKind::Reel, reel, EngagementAction::Save));

        store.clear();
        assert!(!store.is_set(ContentKind::Reel, reel, EngagementAction::Like));
    }
}
