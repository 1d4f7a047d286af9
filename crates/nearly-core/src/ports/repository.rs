use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Activity, ActivityKind, Comment, ContentKind, Engagement, EngagementAction, Event, EventGuest,
    Counter, Group, GroupMember, Media, Message, News, Notification, Page, Poll, Reel, User,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Counters changed with a single conditional update, so concurrent
/// requests never overwrite each other's increments.
#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// Adds `delta` and returns the new value. Never drops below zero.
    async fn bump(&self, id: Uuid, counter: Counter, delta: i64) -> Result<i64, RepoError>;

    /// Adds one unless the counter already reached `cap`; `None` means full.
    async fn bump_capped(
        &self,
        id: Uuid,
        counter: Counter,
        cap: i64,
    ) -> Result<Option<i64>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait ActivityRepository: BaseRepository<Activity, Uuid> + CounterRepository {
    /// Newest first, optionally restricted to one kind.
    async fn list(&self, kind: Option<ActivityKind>, page: Page)
    -> Result<Vec<Activity>, RepoError>;
}

#[async_trait]
pub trait EventRepository: BaseRepository<Event, Uuid> + CounterRepository {
    /// Events starting at or after `from`, soonest first.
    async fn list_upcoming(&self, from: DateTime<Utc>, page: Page)
    -> Result<Vec<Event>, RepoError>;
}

#[async_trait]
pub trait EventGuestRepository: BaseRepository<EventGuest, Uuid> {
    async fn find(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<EventGuest>, RepoError>;

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<EventGuest>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> + CounterRepository {
    /// Every comment on a target, oldest first.
    async fn list_for_target(
        &self,
        kind: ContentKind,
        target_id: Uuid,
    ) -> Result<Vec<Comment>, RepoError>;
}

#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> + CounterRepository {
    async fn list(&self, page: Page) -> Result<Vec<Group>, RepoError>;
}

#[async_trait]
pub trait GroupMemberRepository: BaseRepository<GroupMember, Uuid> {
    async fn find(&self, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupMember>, RepoError>;

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<GroupMember>, RepoError>;
}

#[async_trait]
pub trait NewsRepository: BaseRepository<News, Uuid> + CounterRepository {
    async fn list(&self, category: Option<&str>, page: Page) -> Result<Vec<News>, RepoError>;
}

#[async_trait]
pub trait PollRepository: BaseRepository<Poll, Uuid> {
    async fn list(&self, page: Page) -> Result<Vec<Poll>, RepoError>;

    /// Adds one vote to an option and to the poll total in one write.
    /// `NotFound` when the poll or the option does not exist.
    async fn record_vote(&self, poll_id: Uuid, option_id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait MessageRepository: BaseRepository<Message, Uuid> {
    /// Messages sent or received by a user, newest first.
    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Message>, RepoError>;
}

#[async_trait]
pub trait NotificationRepository: BaseRepository<Notification, Uuid> {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: Page,
    ) -> Result<Vec<Notification>, RepoError>;

    /// Returns the number of notifications changed.
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait MediaRepository: BaseRepository<Media, Uuid> {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<Media>, RepoError>;
}

#[async_trait]
pub trait ReelRepository: BaseRepository<Reel, Uuid> + CounterRepository {
    async fn list(&self, page: Page) -> Result<Vec<Reel>, RepoError>;
}

#[async_trait]
pub trait EngagementRepository: BaseRepository<Engagement, Uuid> {
    async fn find(
        &self,
        user_id: Uuid,
        kind: ContentKind,
        target_id: Uuid,
        action: EngagementAction,
    ) -> Result<Option<Engagement>, RepoError>;

    /// Everything a user has liked, voted on or saved, for hydrating a client session.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Engagement>, RepoError>;
}
