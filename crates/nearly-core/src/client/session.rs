use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engagement::EngagementStore;

/// Refresh this long before the access token expires.
const REFRESH_LEEWAY_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
}

impl TokenPair {
    /// Build from a login/refresh response, which carries a relative lifetime.
    /// A lifetime too large to represent never expires.
    pub fn from_response(
        access_token: String,
        refresh_token: String,
        expires_in_secs: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_at: TimeDelta::try_seconds(expires_in_secs.max(0))
                .and_then(|lifetime| now.checked_add_signed(lifetime))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// Signed-in user's tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: Uuid,
    tokens: TokenPair,
}

impl AuthSession {
    pub fn new(user_id: Uuid, tokens: TokenPair) -> Self {
        Self { user_id, tokens }
    }

    pub fn access_token(&self) -> &str {
        &self.tokens.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.tokens.refresh_token
    }

    pub fn access_expires_at(&self) -> DateTime<Utc> {
        self.tokens.access_expires_at
    }

    /// True from one minute before the access token expires.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now >= self.tokens.access_expires_at - TimeDelta::seconds(REFRESH_LEEWAY_SECS)
    }

    /// Time until the pre-emptive refresh should run; zero when it is due.
    pub fn refresh_in(&self, now: DateTime<Utc>) -> Duration {
        (self.tokens.access_expires_at - TimeDelta::seconds(REFRESH_LEEWAY_SECS) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Store a rotated pair. The old refresh token is revoked server side.
    pub fn rotate(&mut self, tokens: TokenPair) {
        self.tokens = tokens;
    }
}

/// Everything the client keeps for one signed-in user.
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub auth: AuthSession,
    pub engagement: EngagementStore,
}

impl ClientSession {
    pub fn new(auth: AuthSession) -> Self {
        Self {
            auth,
            engagement: EngagementStore::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentKind, EngagementAction};

    fn session(now: DateTime<Utc>) -> AuthSession {
        let tokens = TokenPair::from_response("a".into(), "r".into(), 15 * 60, now);
        AuthSession::new(Uuid::new_v4(), tokens)
    }

    #[test]
    fn test_needs_refresh_one_minute_before_expiry() {
        let now = Utc::now();
        let auth = session(now);
        assert!(!auth.needs_refresh(now));
        assert!(!auth.needs_refresh(now + TimeDelta::minutes(13)));
        assert!(auth.needs_refresh(now + TimeDelta::minutes(14)));
        assert!(auth.needs_refresh(now + TimeDelta::minutes(20)));
    }

    #[test]
    fn test_oversized_lifetime_does_not_overflow() {
        let now = Utc::now();
        let tokens = TokenPair::from_response("a".into(), "r".into(), i64::MAX, now);
        assert_eq!(tokens.access_expires_at, DateTime::<Utc>::MAX_UTC);

        let auth = AuthSession::new(Uuid::new_v4(), tokens);
        assert!(!auth.needs_refresh(now));
        assert!(auth.refresh_in(now) > Duration::from_secs(365 * 24 * 3600));

        let expired = TokenPair::from_response("a".into(), "r".into(), -5, now);
        assert_eq!(expired.access_expires_at, now);
    }

    #[test]
    fn test_refresh_in_counts_down_to_zero() {
        let now = Utc::now();
        let auth = session(now);
        assert_eq!(auth.refresh_in(now), Duration::from_secs(14 * 60));
        assert_eq!(auth.refresh_in(now + TimeDelta::hours(1)), Duration::ZERO);
    }

    #[test]
    fn test_rotate_replaces_tokens() {
        let now = Utc::now();
        let mut auth = session(now);
        let later = now + TimeDelta::minutes(14);
        auth.rotate(TokenPair::from_response("a2".into(), "r2".into(), 900, later));
        assert_eq!(auth.refresh_token(), "r2");
        assert!(!auth.needs_refresh(later));
    }

    #[test]
    fn test_sessions_do_not_share_engagement() {
        let now = Utc::now();
        let mut first = ClientSession::new(session(now));
        let second = ClientSession::new(session(now));
        let reel = Uuid::new_v4();
        let _ = first.engagement.toggle_like(ContentKind::Reel, reel, 0);
        assert!(first.engagement.is_set(ContentKind::Reel, reel, EngagementAction::Like));
        assert!(!second.engagement.is_set(ContentKind::Reel, reel, EngagementAction::Like));
    }
}
