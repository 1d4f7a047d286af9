//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Statement,
};
use uuid::Uuid;

use nearly_core::domain::{
    Activity, ActivityKind, Comment, ContentKind, Counter, Engagement, EngagementAction, Event,
    EventGuest, Group, GroupMember, Media, Message, News, Notification, Page, Poll, Reel, User,
};
use nearly_core::error::RepoError;
use nearly_core::ports::{
    ActivityRepository, CommentRepository, EngagementRepository, EventGuestRepository,
    EventRepository, GroupMemberRepository, GroupRepository, MediaRepository, MessageRepository,
    NewsRepository, NotificationRepository, PollRepository, ReelRepository, UserRepository,
};

use super::entity::{
    activity, comment, engagement, event, event_guest, group, group_member, media, message, news,
    notification, poll, reel, user,
};
use super::postgres_base::{CounterColumns, PostgresBaseRepository, convert_all, map_db_err};

pub type PostgresUserRepository = PostgresBaseRepository<user::Entity>;
pub type PostgresActivityRepository = PostgresBaseRepository<activity::Entity>;
pub type PostgresEventRepository = PostgresBaseRepository<event::Entity>;
pub type PostgresEventGuestRepository = PostgresBaseRepository<event_guest::Entity>;
pub type PostgresCommentRepository = PostgresBaseRepository<comment::Entity>;
pub type PostgresGroupRepository = PostgresBaseRepository<group::Entity>;
pub type PostgresGroupMemberRepository = PostgresBaseRepository<group_member::Entity>;
pub type PostgresNewsRepository = PostgresBaseRepository<news::Entity>;
pub type PostgresPollRepository = PostgresBaseRepository<poll::Entity>;
pub type PostgresMessageRepository = PostgresBaseRepository<message::Entity>;
pub type PostgresNotificationRepository = PostgresBaseRepository<notification::Entity>;
pub type PostgresMediaRepository = PostgresBaseRepository<media::Entity>;
pub type PostgresReelRepository = PostgresBaseRepository<reel::Entity>;
pub type PostgresEngagementRepository = PostgresBaseRepository<engagement::Entity>;

macro_rules! counter_columns {
    ($entity:ident { $($counter:ident => $column:ident),+ $(,)? }) => {
        impl CounterColumns for $entity::Entity {
            fn id_column() -> Self::Column {
                $entity::Column::Id
            }

            fn counter_column(counter: Counter) -> Option<Self::Column> {
                match counter {
                    $(Counter::$counter => Some($entity::Column::$column),)+
                    _ => None,
                }
            }
        }
    };
}

counter_columns!(activity { Likes => LikesCount, Comments => CommentsCount });
counter_columns!(comment { Likes => LikesCount });
counter_columns!(event { Guests => GuestsCount, Comments => CommentsCount });
counter_columns!(group { Members => MembersCount });
counter_columns!(news { Likes => LikesCount, Comments => CommentsCount });
counter_columns!(reel { Likes => LikesCount, Comments => CommentsCount, Views => ViewsCount });

/// Bumps one option inside the `options` jsonb array and the poll total in
/// a single statement. Matches nothing when the option id is unknown.
const RECORD_VOTE_SQL: &str = r#"
UPDATE polls
SET total_votes = total_votes + 1,
    options = (
        SELECT jsonb_agg(
            CASE WHEN opt->>'id' = $2
                THEN jsonb_set(opt, '{votes}', to_jsonb((opt->>'votes')::bigint + 1))
                ELSE opt
            END
            ORDER BY pos
        )
        FROM jsonb_array_elements(options) WITH ORDINALITY AS t(opt, pos)
    )
WHERE id = $1
  AND options @> jsonb_build_array(jsonb_build_object('id', $2::text))
"#;

/// Mask an email for logging to avoid PII in logs.
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result.map(User::try_from).transpose()
    }
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepository {
    async fn list(
        &self,
        kind: Option<ActivityKind>,
        page: Page,
    ) -> Result<Vec<Activity>, RepoError> {
        let mut query = activity::Entity::find();
        if let Some(kind) = kind {
            query = query.filter(activity::Column::Kind.eq(kind.as_str()));
        }

        let rows = query
            .order_by_desc(activity::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn list_upcoming(
        &self,
        from: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Event>, RepoError> {
        let rows = event::Entity::find()
            .filter(event::Column::StartsAt.gte(from))
            .order_by_asc(event::Column::StartsAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl EventGuestRepository for PostgresEventGuestRepository {
    async fn find(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<EventGuest>, RepoError> {
        let result = event_guest::Entity::find()
            .filter(event_guest::Column::EventId.eq(event_id))
            .filter(event_guest::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result.map(EventGuest::try_from).transpose()
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<EventGuest>, RepoError> {
        let rows = event_guest::Entity::find()
            .filter(event_guest::Column::EventId.eq(event_id))
            .order_by_asc(event_guest::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_target(
        &self,
        kind: ContentKind,
        target_id: Uuid,
    ) -> Result<Vec<Comment>, RepoError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::TargetKind.eq(kind.as_str()))
            .filter(comment::Column::TargetId.eq(target_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn list(&self, page: Page) -> Result<Vec<Group>, RepoError> {
        let rows = group::Entity::find()
            .order_by_desc(group::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl GroupMemberRepository for PostgresGroupMemberRepository {
    async fn find(&self, group_id: Uuid, user_id: Uuid) -> Result<Option<GroupMember>, RepoError> {
        let result = group_member::Entity::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result.map(GroupMember::try_from).transpose()
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<GroupMember>, RepoError> {
        let rows = group_member::Entity::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .order_by_asc(group_member::Column::JoinedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl NewsRepository for PostgresNewsRepository {
    async fn list(&self, category: Option<&str>, page: Page) -> Result<Vec<News>, RepoError> {
        let mut query = news::Entity::find();
        if let Some(category) = category {
            query = query.filter(news::Column::Category.eq(category.trim().to_lowercase()));
        }

        let rows = query
            .order_by_desc(news::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl PollRepository for PostgresPollRepository {
    async fn list(&self, page: Page) -> Result<Vec<Poll>, RepoError> {
        let rows = poll::Entity::find()
            .order_by_desc(poll::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }

    async fn record_vote(&self, poll_id: Uuid, option_id: Uuid) -> Result<(), RepoError> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            RECORD_VOTE_SQL,
            [poll_id.into(), option_id.to_string().into()],
        );
        let result = self.db.execute(statement).await.map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn list_for_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Message>, RepoError> {
        let rows = message::Entity::find()
            .filter(
                Condition::any()
                    .add(message::Column::SenderId.eq(user_id))
                    .add(message::Column::RecipientId.eq(user_id)),
            )
            .order_by_desc(message::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: Page,
    ) -> Result<Vec<Notification>, RepoError> {
        let mut query =
            notification::Entity::find().filter(notification::Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(notification::Column::Read.eq(false));
        }

        let rows = query
            .order_by_desc(notification::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::Read, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl MediaRepository for PostgresMediaRepository {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<Media>, RepoError> {
        let rows = media::Entity::find()
            .filter(media::Column::OwnerId.eq(owner_id))
            .order_by_desc(media::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl ReelRepository for PostgresReelRepository {
    async fn list(&self, page: Page) -> Result<Vec<Reel>, RepoError> {
        let rows = reel::Entity::find()
            .order_by_desc(reel::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[async_trait]
impl EngagementRepository for PostgresEngagementRepository {
    async fn find(
        &self,
        user_id: Uuid,
        kind: ContentKind,
        target_id: Uuid,
        action: EngagementAction,
    ) -> Result<Option<Engagement>, RepoError> {
        let result = engagement::Entity::find()
            .filter(engagement::Column::UserId.eq(user_id))
            .filter(engagement::Column::TargetKind.eq(kind.as_str()))
            .filter(engagement::Column::TargetId.eq(target_id))
            .filter(engagement::Column::Action.eq(action.as_str()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result.map(Engagement::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Engagement>, RepoError> {
        let rows = engagement::Entity::find()
            .filter(engagement::Column::UserId.eq(user_id))
            .order_by_asc(engagement::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        convert_all(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ann@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
