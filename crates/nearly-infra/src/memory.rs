//! In-memory repositories - used when no database is configured and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use nearly_core::domain::{
    Activity, ActivityKind, Comment, ContentKind, Counted, Counter, Engagement, EngagementAction,
    Event, EventGuest, Group, GroupMember, Media, Message, News, Notification, Page, Poll, Record,
    Reel, User,
};
use nearly_core::error::RepoError;
use nearly_core::ports::{
    ActivityRepository, BaseRepository, CommentRepository, CounterRepository, EngagementRepository,
    EventGuestRepository, EventRepository, GroupMemberRepository, GroupRepository,
    MediaRepository, MessageRepository, NewsRepository, NotificationRepository, PollRepository,
    ReelRepository, UserRepository,
};

/// Extracts a value that must be unique across rows, like a unique index.
type UniqueKey<T> = fn(&T) -> String;

/// Generic repository over a HashMap behind an async RwLock.
pub struct InMemoryRepository<T> {
    rows: RwLock<HashMap<Uuid, T>>,
    unique: Vec<(&'static str, UniqueKey<T>)>,
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryActivityRepository = InMemoryRepository<Activity>;
pub type InMemoryEventRepository = InMemoryRepository<Event>;
pub type InMemoryEventGuestRepository = InMemoryRepository<EventGuest>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;
pub type InMemoryGroupRepository = InMemoryRepository<Group>;
pub type InMemoryGroupMemberRepository = InMemoryRepository<GroupMember>;
pub type InMemoryNewsRepository = InMemoryRepository<News>;
pub type InMemoryPollRepository = InMemoryRepository<Poll>;
pub type InMemoryMessageRepository = InMemoryRepository<Message>;
pub type InMemoryNotificationRepository = InMemoryRepository<Notification>;
pub type InMemoryMediaRepository = InMemoryRepository<Media>;
pub type InMemoryReelRepository = InMemoryRepository<Reel>;
pub type InMemoryEngagementRepository = InMemoryRepository<Engagement>;

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            unique: Vec::new(),
        }
    }

    /// Reject saves that would duplicate `key` on another row.
    pub fn with_unique(mut self, name: &'static str, key: UniqueKey<T>) -> Self {
        self.unique.push((name, key));
        self
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Rows matching `pred`, newest first.
    async fn newest_first(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<T> = self
            .rows
            .read()
            .await
            .values()
            .filter(|r| pred(r))
            .cloned()
            .collect();
        rows.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        rows
    }

    /// Rows matching `pred`, oldest first.
    async fn oldest_first(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows = self.newest_first(pred).await;
        rows.reverse();
        rows
    }

    async fn find_one(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().await.values().find(|r| pred(r)).cloned()
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate<T>(rows: Vec<T>, page: Page) -> Vec<T> {
    rows.into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl<T: Record> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        let id = entity.id();

        for (name, key) in &self.unique {
            let value = key(&entity);
            if rows.values().any(|r| r.id() != id && key(r) == value) {
                return Err(RepoError::Constraint(format!("duplicate {name}")));
            }
        }

        rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

impl<T: Record + Counted> InMemoryRepository<T> {
    /// Applies the change under the write lock, so it cannot interleave with another.
    async fn bump_row(
        &self,
        id: Uuid,
        counter: Counter,
        delta: i64,
        cap: Option<i64>,
    ) -> Result<Option<i64>, RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        row.bump(counter, delta, cap)
            .map_err(|e| RepoError::Query(e.to_string()))
    }
}

#[async_trait]
impl<T: Record + Counted> CounterRepository for InMemoryRepository<T> {
    async fn bump(&self, id: Uuid, counter: Counter, delta: i64) -> Result<i64, RepoError> {
        let value = self.bump_row(id, counter, delta, None).await?;
        value.ok_or_else(|| RepoError::Query(format!("{counter} was not updated")))
    }

    async fn bump_capped(
        &self,
        id: Uuid,
        counter: Counter,
        cap: i64,
    ) -> Result<Option<i64>, RepoError> {
        self.bump_row(id, counter, 1, Some(cap)).await
    }
}

impl InMemoryUserRepository {
    /// Users with the unique email and username indexes of the real schema.
    pub fn for_users() -> Self {
        Self::new()
            .with_unique("email", |u: &User| u.email.clone())
            .with_unique("username", |u: &User| u.username.clone())
    }
}

impl InMemoryEngagementRepository {
    /// One engagement per (user, target, action).
    pub fn for_engagements() -> Self {
        Self::new().with_unique("engagement", |e: &Engagement| {
            format!(
                "{}:{}:{}:{}",
                e.user_id,
                e.target_kind.as_str(),
                e.target_id,
                e.action.as_str()
            )
        })
    }
}

impl InMemoryEventGuestRepository {
    pub fn for_guests() -> Self {
        Self::new().with_unique("guest", |g: &EventGuest| {
            format!("{}:{}", g.event_id, g.user_id)
        })
    }
}

impl InMemoryGroupMemberRepository {
    pub fn for_members() -> Self {
        Self::new().with_unique("member", |m: &GroupMember| {
            format!("{}:{}", m.group_id, m.user_id)
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let email = email.trim().to_lowercase();
        Ok(self.find_one(|u| u.email == email).await)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let username = username.trim().to_lowercase();
        Ok(self.find_one(|u| u.username == username).await)
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn list(
        &self,
        kind: Option<ActivityKind>,
        page: Page,
    ) -> Result<Vec<Activity>, RepoError> {
        let rows = self
            .newest_first(|a| kind.is_none_or(|k| a.kind == k))
            .await;
        Ok(paginate(rows, page))
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn list_upcoming(
        &self,
        from: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Event>, RepoError> {
        let mut rows = self.oldest_first(|e| e.starts_at >= from).await;
        rows.sort_by_key(|e| e.starts_at);
        Ok(paginate(rows, page))
    }
}

#[async_trait]
impl EventGuestRepository for InMemoryEventGuestRepository {
    async fn find(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<EventGuest>, RepoError> {
        Ok(self
            .find_one(|g| g.event_id == event_id && g.user_id == user_id)
            .await)
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<EventGuest>, RepoError> {
        Ok(self.oldest_first(|g| g.event_id == event_id).await)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_target(
        &self,
        kind: ContentKind,
        target_id: Uuid,
    ) -> Result<Vec<Comment>, RepoError> {
        Ok(self
            .oldest_first(|c| c.target_kind == kind && c.target_id == target_id)
            .await)
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn list(&self, page: Page) -> Result<Vec<Group>, RepoError> {
        Ok(paginate(self.newest_first(|_| true).await, page))
    }
}

#[async_trait]
impl GroupMemberRepository for InMemoryGroupMemberRepository {
    async fn find(&self, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupMember>, RepoError> {
        Ok(self
            .find_one(|m| m.group_id == group_id && m.user_id == user_id)
            .await)
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<GroupMember>, RepoError> {
        Ok(self.oldest_first(|m| m.group_id == group_id).await)
    }
}

#[async_trait]
impl NewsRepository for InMemoryNewsRepository {
    async fn list(&self, category: Option<&str>, page: Page) -> Result<Vec<News>, RepoError> {
        let category = category.map(|c| c.trim().to_lowercase());
        let rows = self
            .newest_first(|n| category.as_ref().is_none_or(|c| &n.category == c))
            .await;
        Ok(paginate(rows, page))
    }
}

#[async_trait]
impl PollRepository for InMemoryPollRepository {
    async fn list(&self, page: Page) -> Result<Vec<Poll>, RepoError> {
        Ok(paginate(self.newest_first(|_| true).await, page))
    }

    async fn record_vote(&self, poll_id: Uuid, option_id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let poll = rows.get_mut(&poll_id).ok_or(RepoError::NotFound)?;
        let option = poll
            .options
            .iter_mut()
            .find(|o| o.id == option_id)
            .ok_or(RepoError::NotFound)?;
        option.votes += 1;
        poll.total_votes += 1;
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Message>, RepoError> {
        Ok(paginate(self.newest_first(|m| m.involves(user_id)).await, page))
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: Page,
    ) -> Result<Vec<Notification>, RepoError> {
        let rows = self
            .newest_first(|n| n.user_id == user_id && !(unread_only && n.read))
            .await;
        Ok(paginate(rows, page))
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let mut rows = self.rows.write().await;
        let mut updated = 0;
        for n in rows.values_mut().filter(|n| n.user_id == user_id && !n.read) {
            n.mark_read();
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<Media>, RepoError> {
        Ok(paginate(self.newest_first(|m| m.owner_id == owner_id).await, page))
    }
}

#[async_trait]
impl ReelRepository for InMemoryReelRepository {
    async fn list(&self, page: Page) -> Result<Vec<Reel>, RepoError> {
        Ok(paginate(self.newest_first(|_| true).await, page))
    }
}

#[async_trait]
impl EngagementRepository for InMemoryEngagementRepository {
    async fn find(
        &self,
        user_id: Uuid,
        kind: ContentKind,
        target_id: Uuid,
        action: EngagementAction,
    ) -> Result<Option<Engagement>, RepoError> {
        Ok(self
            .find_one(|e| {
                e.user_id == user_id
                    && e.target_kind == kind
                    && e.target_id == target_id
                    && e.action == action
            })
            .await)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Engagement>, RepoError> {
        Ok(self.oldest_first(|e| e.user_id == user_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nearly_core::domain::NotificationKind;

    #[tokio::test]
    async fn test_save_find_delete() {
        let repo = InMemoryUserRepository::for_users();
        let user = User::new("ann@example.com".into(), "ann".into(), "h".into()).unwrap();
        let id = user.id;

        repo.save(user).await.unwrap();
        assert!(repo.find_by_id(id).await.unwrap().is_some());
        assert!(repo.find_by_email("ANN@example.com").await.unwrap().is_some());

        repo.delete(id).await.unwrap();
        assert!(matches!(repo.delete(id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_unique_email_enforced_but_updates_allowed() {
        let repo = InMemoryUserRepository::for_users();
        let mut ann = User::new("ann@example.com".into(), "ann".into(), "h".into()).unwrap();
        repo.save(ann.clone()).await.unwrap();

        let twin = User::new("ann@example.com".into(), "ann2".into(), "h".into()).unwrap();
        assert!(matches!(repo.save(twin).await, Err(RepoError::Constraint(_))));

        ann.display_name = "Ann B".into();
        repo.save(ann).await.unwrap();
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_engagement_unique_per_user_target_action() {
        let repo = InMemoryEngagementRepository::for_engagements();
        let (user, target) = (Uuid::new_v4(), Uuid::new_v4());
        let like = || Engagement::new(user, ContentKind::Reel, target, EngagementAction::Like, None);

        repo.save(like()).await.unwrap();
        assert!(matches!(repo.save(like()).await, Err(RepoError::Constraint(_))));

        let save = Engagement::new(user, ContentKind::Reel, target, EngagementAction::Save, None);
        repo.save(save).await.unwrap();
        assert_eq!(repo.list_for_user(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_lists_are_ordered_and_paginated() {
        let repo = InMemoryActivityRepository::new();
        let user = Uuid::new_v4();
        for i in 0..5 {
            let mut a = Activity::new(user, ActivityKind::Question, &format!("q{i}"), "", None)
                .unwrap();
            a.created_at = Utc::now() - Duration::minutes(10 - i);
            repo.save(a).await.unwrap();
        }

        let page = repo.list(None, Page::new(Some(2), Some(1))).await.unwrap();
        let titles: Vec<_> = page.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["q3", "q2"]);

        let none = repo
            .list(Some(ActivityKind::Discussion), Page::default())
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_mark_all_read_counts_only_unread() {
        let repo = InMemoryNotificationRepository::new();
        let user = Uuid::new_v4();
        for _ in 0..3 {
            repo.save(Notification::new(user, NotificationKind::Like, "liked"))
                .await
                .unwrap();
        }
        let mut read = Notification::new(user, NotificationKind::Comment, "commented");
        read.mark_read();
        repo.save(read).await.unwrap();

        let unread = repo.list_for_user(user, true, Page::default()).await.unwrap();
        assert_eq!(unread.len(), 3);
        assert_eq!(repo.mark_all_read(user).await.unwrap(), 3);
        assert_eq!(repo.mark_all_read(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_bumps_are_all_counted() {
        let repo = std::sync::Arc::new(InMemoryReelRepository::new());
        let reel = Reel::new(Uuid::new_v4(), Uuid::new_v4(), Some("clip".into())).unwrap();
        let id = reel.id;
        repo.save(reel).await.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.bump(id, Counter::Views, 1).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.views_count, 20);
        assert_eq!(repo.bump(id, Counter::Views, -25).await.unwrap(), 0);
        assert!(matches!(
            repo.bump(id, Counter::Guests, 1).await,
            Err(RepoError::Query(_))
        ));
        assert!(matches!(
            repo.bump(Uuid::new_v4(), Counter::Views, 1).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_capped_bump_stops_at_capacity() {
        let repo = InMemoryEventRepository::new();
        let start = Utc::now() + Duration::days(1);
        let event = Event::new(Uuid::new_v4(), "Party", "", None, start, None, Some(2)).unwrap();
        let id = event.id;
        repo.save(event).await.unwrap();

        assert_eq!(repo.bump_capped(id, Counter::Guests, 2).await.unwrap(), Some(1));
        assert_eq!(repo.bump_capped(id, Counter::Guests, 2).await.unwrap(), Some(2));
        assert_eq!(repo.bump_capped(id, Counter::Guests, 2).await.unwrap(), None);
        assert_eq!(repo.bump(id, Counter::Guests, -1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_vote_tallies_option_and_total() {
        let repo = InMemoryPollRepository::new();
        let labels = vec!["Sat".to_string(), "Sun".to_string()];
        let poll = Poll::new(Uuid::new_v4(), "Park day?", &labels, None).unwrap();
        let (id, sat) = (poll.id, poll.options[0].id);
        repo.save(poll).await.unwrap();

        repo.record_vote(id, sat).await.unwrap();
        repo.record_vote(id, sat).await.unwrap();
        assert!(matches!(
            repo.record_vote(id, Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.total_votes, 2);
        assert_eq!(stored.options[0].votes, 2);
        assert_eq!(stored.options[1].votes, 0);
    }
}
