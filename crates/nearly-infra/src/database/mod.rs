//! PostgreSQL persistence via SeaORM.

mod connections;
mod postgres_base;
mod postgres_repo;

pub mod entity;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresActivityRepository, PostgresCommentRepository, PostgresEngagementRepository,
    PostgresEventGuestRepository, PostgresEventRepository, PostgresGroupMemberRepository,
    PostgresGroupRepository, PostgresMediaRepository, PostgresMessageRepository,
    PostgresNewsRepository, PostgresNotificationRepository, PostgresPollRepository,
    PostgresReelRepository, PostgresUserRepository,
};

#[cfg(test)]
mod tests;
