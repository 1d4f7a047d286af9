//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nearly_core::domain::{
    ActivityKind, ContentKind, EngagementAction, GroupPrivacy, GuestStatus, MediaType, Page,
    Poll, PollResult, Reel, UploadStrategy, User, VideoDescriptor,
};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `/refresh` and `/logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    pub new_password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

impl AuthResponse {
    pub fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: expires_in.max(0) as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTokenResponse {
    pub reset_token: String,
    pub expires_in: u64,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Response containing a user's profile. The email is only present on the
/// caller's own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn public(user: &User) -> Self {
        Self {
            id: user.id,
            email: None,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            location: user.location.clone(),
            followers_count: user.followers_count,
            following_count: user.following_count,
            created_at: user.created_at,
        }
    }

    pub fn own(user: &User) -> Self {
        Self {
            email: Some(user.email.clone()),
            ..Self::public(user)
        }
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// `?limit=&offset=` query parameters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        Page::new(self.limit, self.offset)
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub limit: u64,
    pub offset: u64,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, page: Page) -> Self {
        Self {
            items,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(default = "default_activity_kind")]
    pub kind: ActivityKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub location: Option<String>,
}

fn default_activity_kind() -> ActivityKind {
    ActivityKind::Activity
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityQuery {
    pub kind: Option<ActivityKind>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsvpRequest {
    pub status: GuestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_privacy")]
    pub privacy: GroupPrivacy,
}

fn default_privacy() -> GroupPrivacy {
    GroupPrivacy::Public
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNewsRequest {
    pub title: String,
    pub body: String,
    pub category: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsQuery {
    pub category: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
    pub closes_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub option_id: Uuid,
}

/// Poll with its tally and the caller's own vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub question: String,
    pub options: Vec<PollResult>,
    pub total_votes: i64,
    pub closes_at: Option<DateTime<Utc>>,
    pub closed: bool,
    pub my_choice: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl PollResponse {
    pub fn new(poll: &Poll, my_choice: Option<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            id: poll.id,
            author_id: poll.author_id,
            question: poll.question.clone(),
            options: poll.results(),
            total_votes: poll.total_votes,
            closes_at: poll.closes_at,
            closed: poll.is_closed(now),
            my_choice,
            created_at: poll.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
    pub parent_comment_id: Option<Uuid>,
}

/// State of one engagement flag after a like/save call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementResponse {
    pub target_kind: ContentKind,
    pub target_id: Uuid,
    pub action: EngagementAction,
    pub active: bool,
    /// Counter of the target after the change, when the action has one.
    pub count: Option<i64>,
}

// ---------------------------------------------------------------------------
// Messages and notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// Media and reels
// ---------------------------------------------------------------------------

/// Register a file that was uploaded to storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMediaRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub url: String,
    pub thumbnail_url: Option<String>,
}

/// Ask how a file of a given size should be uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPlanRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPlanResponse {
    pub strategy: UploadStrategy,
    pub media_type: MediaType,
    pub direct_limit_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReelRequest {
    pub media_id: Uuid,
    pub caption: Option<String>,
}

/// Reel together with the streaming descriptor of its video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelResponse {
    #[serde(flatten)]
    pub reel: Reel,
    /// `None` when the media row is gone or is not a video.
    pub video: Option<VideoDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_profile_hides_email() {
        let user = User::new(
            "Ann@Example.com".into(),
            "ann".into(),
            "hash".into(),
        )
        .unwrap();

        let public = serde_json::to_value(UserResponse::public(&user)).unwrap();
        assert!(public.get("email").is_none());
        assert!(public.get("password_hash").is_none());

        let own = serde_json::to_value(UserResponse::own(&user)).unwrap();
        assert_eq!(own["email"], "ann@example.com");
    }

    #[test]
    fn test_create_activity_defaults_kind() {
        let req: CreateActivityRequest =
            serde_json::from_str(r#"{"title":"Lost cat"}"#).unwrap();
        assert_eq!(req.kind, ActivityKind::Activity);
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_page_query_clamps() {
        let q = PageQuery {
            limit: Some(1000),
            offset: None,
        };
        assert_eq!(q.page().limit, Page::MAX_LIMIT);
    }
}
