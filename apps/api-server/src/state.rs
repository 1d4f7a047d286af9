//! Application state - shared across all handlers.

use std::sync::Arc;

use nearly_core::ports::{
    ActivityRepository, Cache, CommentRepository, EngagementRepository, EventGuestRepository,
    EventRepository, GroupMemberRepository, GroupRepository, MediaRepository, MessageRepository,
    NewsRepository, NotificationRepository, PasswordService, PollRepository, RateLimiter,
    ReelRepository, TokenService, UserRepository,
};
use nearly_infra::auth::{Argon2PasswordService, JwtTokenService};
use nearly_infra::cache::InMemoryCache;
use nearly_infra::memory::{
    InMemoryActivityRepository, InMemoryCommentRepository, InMemoryEngagementRepository,
    InMemoryEventGuestRepository, InMemoryEventRepository, InMemoryGroupMemberRepository,
    InMemoryGroupRepository, InMemoryMediaRepository, InMemoryMessageRepository,
    InMemoryNewsRepository, InMemoryNotificationRepository, InMemoryPollRepository,
    InMemoryReelRepository, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
use nearly_infra::database::{
    DatabaseConnections, PostgresActivityRepository, PostgresCommentRepository,
    PostgresEngagementRepository, PostgresEventGuestRepository, PostgresEventRepository,
    PostgresGroupMemberRepository, PostgresGroupRepository, PostgresMediaRepository,
    PostgresMessageRepository, PostgresNewsRepository, PostgresNotificationRepository,
    PostgresPollRepository, PostgresReelRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// One handle per table.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub events: Arc<dyn EventRepository>,
    pub event_guests: Arc<dyn EventGuestRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub group_members: Arc<dyn GroupMemberRepository>,
    pub news: Arc<dyn NewsRepository>,
    pub polls: Arc<dyn PollRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub media: Arc<dyn MediaRepository>,
    pub reels: Arc<dyn ReelRepository>,
    pub engagements: Arc<dyn EngagementRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::for_users()),
            activities: Arc::new(InMemoryActivityRepository::new()),
            events: Arc::new(InMemoryEventRepository::new()),
            event_guests: Arc::new(InMemoryEventGuestRepository::for_guests()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            groups: Arc::new(InMemoryGroupRepository::new()),
            group_members: Arc::new(InMemoryGroupMemberRepository::for_members()),
            news: Arc::new(InMemoryNewsRepository::new()),
            polls: Arc::new(InMemoryPollRepository::new()),
            messages: Arc::new(InMemoryMessageRepository::new()),
            notifications: Arc::new(InMemoryNotificationRepository::new()),
            media: Arc::new(InMemoryMediaRepository::new()),
            reels: Arc::new(InMemoryReelRepository::new()),
            engagements: Arc::new(InMemoryEngagementRepository::for_engagements()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: &DatabaseConnections) -> Self {
        let conn = &db.main;
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            activities: Arc::new(PostgresActivityRepository::new(conn.clone())),
            events: Arc::new(PostgresEventRepository::new(conn.clone())),
            event_guests: Arc::new(PostgresEventGuestRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
            group_members: Arc::new(PostgresGroupMemberRepository::new(conn.clone())),
            news: Arc::new(PostgresNewsRepository::new(conn.clone())),
            polls: Arc::new(PostgresPollRepository::new(conn.clone())),
            messages: Arc::new(PostgresMessageRepository::new(conn.clone())),
            notifications: Arc::new(PostgresNotificationRepository::new(conn.clone())),
            media: Arc::new(PostgresMediaRepository::new(conn.clone())),
            reels: Arc::new(PostgresReelRepository::new(conn.clone())),
            engagements: Arc::new(PostgresEngagementRepository::new(conn.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
    pub cache: Arc<dyn Cache>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Applied to `/api/auth`; `None` disables limiting.
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// The cache comes in concrete so the caller can schedule purges on it.
    pub async fn new(config: AppConfig, cache: Arc<InMemoryCache>) -> Self {
        #[cfg(feature = "postgres")]
        let (db, repos) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let repos = Repositories::postgres(&connections);
                    (Some(Arc::new(connections)), repos)
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Failed to connect to database. Using in-memory repositories."
                    );
                    (None, Repositories::in_memory())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running on in-memory repositories.");
                (None, Repositories::in_memory())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Repositories::in_memory()
        };

        let state = Self {
            config: Arc::new(config),
            repos,
            cache,
            tokens: Arc::new(JwtTokenService::from_env()),
            passwords: Arc::new(Argon2PasswordService::new()),
            rate_limiter: None,
            #[cfg(feature = "postgres")]
            db,
        };

        tracing::info!("Application state initialized");
        state
    }

    /// Fully in-memory state with the default JWT settings.
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            repos: Repositories::in_memory(),
            cache: Arc::new(InMemoryCache::new()),
            tokens: Arc::new(JwtTokenService::new(Default::default())),
            passwords: Arc::new(Argon2PasswordService::new()),
            rate_limiter: None,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// `"postgres"` or `"in-memory"`, reported by the health check.
    #[cfg(feature = "postgres")]
    pub fn storage(&self) -> &'static str {
        if self.db.is_some() { "postgres" } else { "in-memory" }
    }

    #[cfg(not(feature = "postgres"))]
    pub fn storage(&self) -> &'static str {
        "in-memory"
    }

    /// `None` without a database, otherwise whether it answered a ping.
    #[cfg(feature = "postgres")]
    pub async fn database_up(&self) -> Option<bool> {
        let db = self.db.as_ref()?;
        match db.ping().await {
            Ok(()) => Some(true),
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                Some(false)
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    pub async fn database_up(&self) -> Option<bool> {
        None
    }
}
