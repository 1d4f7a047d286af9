use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::json;
use uuid::Uuid;

use nearly_core::domain::{ActivityKind, Counter, Page, Poll, User};
use nearly_core::error::RepoError;
use nearly_core::ports::{
    ActivityRepository, BaseRepository, CounterRepository, NotificationRepository,
    PollRepository, UserRepository,
};

use super::entity::{activity, event, poll, user};
use super::postgres_repo::{
    PostgresActivityRepository, PostgresEventRepository, PostgresNotificationRepository,
    PostgresPollRepository, PostgresUserRepository,
};

fn user_model(id: Uuid) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        email: "ann@example.com".to_owned(),
        username: "ann".to_owned(),
        display_name: "Ann".to_owned(),
        bio: None,
        avatar_url: None,
        location: Some("Elm St".to_owned()),
        followers_count: 3,
        following_count: 1,
        password_hash: "hash".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn activity_model(kind: &str) -> activity::Model {
    let now = Utc::now();
    activity::Model {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        kind: kind.to_owned(),
        title: "Who has a ladder?".to_owned(),
        body: String::new(),
        location: None,
        likes_count: 0,
        comments_count: 2,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_user_by_email() {
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(id)]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user = repo.find_by_email("Ann@Example.com").await.unwrap().unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.username, "ann");
    assert_eq!(user.followers_count, 3);
}

#[tokio::test]
async fn test_find_poll_decodes_json_options() {
    let poll_id = Uuid::new_v4();
    let yes = Uuid::new_v4();
    let no = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![poll::Model {
            id: poll_id,
            author_id: Uuid::new_v4(),
            question: "New bike lane?".to_owned(),
            options: json!([
                {"id": yes, "label": "Yes", "votes": 3},
                {"id": no, "label": "No", "votes": 1}
            ]),
            total_votes: 4,
            closes_at: None,
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresPollRepository::new(db);
    let poll: Poll = repo.find_by_id(poll_id).await.unwrap().unwrap();

    assert_eq!(poll.options.len(), 2);
    assert_eq!(poll.options[0].id, yes);
    let results = poll.results();
    assert_eq!(results[0].percentage, 75.0);
    assert_eq!(results[1].percentage, 25.0);
}

#[tokio::test]
async fn test_list_activities_converts_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![activity_model("question"), activity_model("discussion")]])
        .into_connection();

    let repo = PostgresActivityRepository::new(db);
    let items = repo.list(None, Page::default()).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].kind, ActivityKind::Question);
    assert_eq!(items[1].kind, ActivityKind::Discussion);
}

#[tokio::test]
async fn test_corrupt_enum_column_is_reported() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![activity_model("poster")]])
        .into_connection();

    let repo = PostgresActivityRepository::new(db);
    let result = repo.list(None, Page::default()).await;

    assert!(matches!(result, Err(RepoError::Corrupt(_))));
}

#[tokio::test]
async fn test_save_inserts_new_user() {
    let id = Uuid::new_v4();
    let stored = user_model(id);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // existence check finds nothing
        .append_query_results([Vec::<user::Model>::new()])
        // INSERT ... RETURNING
        .append_query_results([vec![stored.clone()]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let mut user = User::new(stored.email.clone(), stored.username.clone(), "hash".into()).unwrap();
    user.id = id;

    let saved: User = repo.save(user).await.unwrap();
    assert_eq!(saved.id, id);
    assert_eq!(saved.location.as_deref(), Some("Elm St"));
}

#[tokio::test]
async fn test_delete_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let result = BaseRepository::<User, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_mark_all_read_reports_updated_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 3,
        }])
        .into_connection();

    let repo = PostgresNotificationRepository::new(db);
    assert_eq!(repo.mark_all_read(Uuid::new_v4()).await.unwrap(), 3);
}

fn updated(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn event_model(guests_count: i64) -> event::Model {
    let now = Utc::now();
    event::Model {
        id: Uuid::new_v4(),
        host_id: Uuid::new_v4(),
        title: "Street party".to_owned(),
        description: String::new(),
        location: None,
        starts_at: now.into(),
        ends_at: None,
        capacity: Some(2),
        guests_count,
        comments_count: 0,
        created_at: now.into(),
    }
}

#[tokio::test]
async fn test_bump_updates_in_place_and_reads_back() {
    let mut row = activity_model("question");
    row.likes_count = 5;
    let id = row.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([updated(1)])
        .append_query_results([vec![row]])
        .into_connection();

    let repo = PostgresActivityRepository::new(db);
    assert_eq!(repo.bump(id, Counter::Likes, 1).await.unwrap(), 5);
}

#[tokio::test]
async fn test_bump_of_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([updated(0)])
        .append_query_results([Vec::<activity::Model>::new()])
        .into_connection();

    let repo = PostgresActivityRepository::new(db);
    let result = repo.bump(Uuid::new_v4(), Counter::Likes, 1).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_bump_of_unknown_column_is_rejected_before_querying() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let repo = PostgresActivityRepository::new(db);
    let result = repo.bump(Uuid::new_v4(), Counter::Views, 1).await;
    assert!(matches!(result, Err(RepoError::Query(_))));
}

#[tokio::test]
async fn test_capped_bump_reports_full_event() {
    let row = event_model(2);
    let id = row.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([updated(0)])
        .append_query_results([vec![row]])
        .into_connection();

    let repo = PostgresEventRepository::new(db);
    assert_eq!(repo.bump_capped(id, Counter::Guests, 2).await.unwrap(), None);
}

#[tokio::test]
async fn test_capped_bump_returns_new_headcount() {
    let row = event_model(1);
    let id = row.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([updated(1)])
        .append_query_results([vec![row]])
        .into_connection();

    let repo = PostgresEventRepository::new(db);
    assert_eq!(repo.bump_capped(id, Counter::Guests, 2).await.unwrap(), Some(1));
}

#[tokio::test]
async fn test_record_vote_on_unknown_option_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([updated(1), updated(0)])
        .into_connection();

    let repo = PostgresPollRepository::new(db);
    repo.record_vote(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
    let result = repo.record_vote(Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}
