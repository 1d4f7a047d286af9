//! Authentication and authorization ports.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims stored in JWT tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub kind: TokenKind,
    /// Unique token id; refresh tokens are tracked and revoked by it.
    pub jti: Uuid,
    pub exp: i64,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Generate a short-lived access token for a user.
    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
    ) -> Result<IssuedToken, AuthError>;

    /// Generate a long-lived refresh token for a user.
    fn generate_refresh_token(&self, user_id: Uuid, email: &str) -> Result<IssuedToken, AuthError>;

    /// Validate and decode an access token. Refresh tokens are rejected.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Validate and decode a refresh token. Access tokens are rejected.
    fn validate_refresh_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of access tokens in seconds.
    fn expiration_seconds(&self) -> i64;

    /// Lifetime of refresh tokens in seconds.
    fn refresh_expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;

    /// Reject a new password that does not meet the policy.
    fn check_policy(&self, password: &str) -> Result<(), AuthError>;

    /// Random six-digit code for the password reset flow.
    fn one_time_code(&self) -> String;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("{0}")]
    WeakPassword(String),
}
