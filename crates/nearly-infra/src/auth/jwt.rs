//! JWT token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nearly_core::ports::{AuthError, IssuedToken, TokenClaims, TokenKind, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 30,
            issuer: "nearly-api".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        Self {
            secret,
            access_ttl_minutes: env_i64("JWT_ACCESS_TTL_MINUTES", defaults.access_ttl_minutes),
            refresh_ttl_days: env_i64("JWT_REFRESH_TTL_DAYS", defaults.refresh_ttl_days),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v: &i64| *v > 0)
        .unwrap_or(default)
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    email: String,
    #[serde(default)]
    roles: Vec<String>,
    typ: String, // "access" | "refresh"
    jti: String,
    exp: i64,
    iat: i64,
    iss: String,
}

/// JWT-based token service issuing access and refresh tokens.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
        kind: TokenKind,
        lifetime: TimeDelta,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + lifetime;
        let jti = Uuid::new_v4();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            roles,
            typ: kind.as_str().to_string(),
            jti: jti.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    fn decode_as(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        let claims = data.claims;

        if claims.typ != expected.as_str() {
            return Err(AuthError::InvalidToken(format!(
                "expected {} token, got {}",
                expected.as_str(),
                claims.typ
            )));
        }

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let jti =
            Uuid::parse_str(&claims.jti).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            email: claims.email,
            roles: claims.roles,
            kind: expected,
            jti,
            exp: claims.exp,
        })
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
    ) -> Result<IssuedToken, AuthError> {
        self.issue(
            user_id,
            email,
            roles,
            TokenKind::Access,
            TimeDelta::minutes(self.config.access_ttl_minutes),
        )
    }

    fn generate_refresh_token(&self, user_id: Uuid, email: &str) -> Result<IssuedToken, AuthError> {
        self.issue(
            user_id,
            email,
            Vec::new(),
            TokenKind::Refresh,
            TimeDelta::days(self.config.refresh_ttl_days),
        )
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.decode_as(token, TokenKind::Access)
    }

    fn validate_refresh_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.decode_as(token, TokenKind::Refresh)
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.access_ttl_minutes * 60
    }

    fn refresh_expiration_seconds(&self) -> i64 {
        self.config.refresh_ttl_days * 86_400
    }
}
