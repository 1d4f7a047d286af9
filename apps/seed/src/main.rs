//! Seed CLI: fills an empty database with a small demo neighbourhood.
//!
//! Run after `migration up`. Does nothing if the demo users already exist.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use nearly_core::domain::{
    Activity, ActivityKind, Event, EventGuest, Group, GroupPrivacy, GuestStatus, News, Poll,
    User,
};
use nearly_core::ports::{BaseRepository, PasswordService, UserRepository};
use nearly_infra::Argon2PasswordService;
use nearly_infra::database::{
    DatabaseConfig, DatabaseConnections, PostgresActivityRepository, PostgresEventGuestRepository,
    PostgresEventRepository, PostgresGroupMemberRepository, PostgresGroupRepository,
    PostgresNewsRepository, PostgresPollRepository, PostgresUserRepository,
};

const DEMO_PASSWORD: &str = "nearly-demo";
const DEMO_USERS: [(&str, &str); 3] = [
    ("alice@nearly.local", "alice"),
    ("bruno@nearly.local", "bruno"),
    ("chen@nearly.local", "chen"),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let db = DatabaseConnections::init(&config)
        .await
        .context("connecting to the database")?;
    let conn = &db.main;

    let users = PostgresUserRepository::new(conn.clone());
    if users.find_by_email(DEMO_USERS[0].0).await?.is_some() {
        tracing::info!("Demo data already present, nothing to do");
        return Ok(());
    }

    let passwords = Argon2PasswordService::new();
    let hash = passwords.hash(DEMO_PASSWORD)?;

    let mut people = Vec::with_capacity(DEMO_USERS.len());
    for (email, username) in DEMO_USERS {
        let user = User::new(email.to_string(), username.to_string(), hash.clone())?;
        people.push(
            users
                .save(user)
                .await
                .with_context(|| format!("creating user {username}"))?,
        );
    }
    let (alice, bruno, chen) = (&people[0], &people[1], &people[2]);

    let activities = PostgresActivityRepository::new(conn.clone());
    activities
        .save(Activity::new(
            alice.id,
            ActivityKind::Question,
            "Good bakery around here?",
            "Just moved in, looking for fresh bread on Sundays.",
            Some("Riverside".to_string()),
        )?)
        .await?;

    let groups = PostgresGroupRepository::new(conn.clone());
    let members = PostgresGroupMemberRepository::new(conn.clone());
    let (group, owner) = Group::new(
        bruno.id,
        "Riverside gardeners",
        "Seed swaps and shared tools.",
        GroupPrivacy::Public,
    )?;
    groups.save(group).await?;
    members.save(owner).await?;

    let events = PostgresEventRepository::new(conn.clone());
    let guests = PostgresEventGuestRepository::new(conn.clone());
    let mut event = Event::new(
        chen.id,
        "Street clean-up",
        "Gloves and bags provided.",
        Some("Market square".to_string()),
        Utc::now() + Duration::days(5),
        None,
        Some(30),
    )?;
    event.apply_rsvp(None, GuestStatus::Going)?;
    let event = events.save(event).await?;
    guests
        .save(EventGuest::new(event.id, alice.id, GuestStatus::Going))
        .await?;

    let news = PostgresNewsRepository::new(conn.clone());
    news.save(News::new(
        bruno.id,
        "Library reopens on Monday",
        "The renovated reading room opens at 9am with extended hours.",
        "community",
        None,
    )?)
    .await?;

    let polls = PostgresPollRepository::new(conn.clone());
    polls
        .save(Poll::new(
            alice.id,
            "Which night for the neighbourhood dinner?",
            &["Friday".to_string(), "Saturday".to_string()],
            Some(Utc::now() + Duration::days(7)),
        )?)
        .await?;

    tracing::info!(
        users = people.len(),
        password = DEMO_PASSWORD,
        "Demo data loaded"
    );
    Ok(())
}
