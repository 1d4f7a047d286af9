use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, optional_text, required_text};
use crate::error::DomainError;

/// User entity - a member of a neighbourhood.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a user may change from the profile editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
}

impl User {
    /// Create a new user; the display name starts out as the username.
    pub fn new(email: String, username: String, password_hash: String) -> Result<Self, DomainError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email address"));
        }
        let username = Self::validate_username(&username)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            display_name: username.clone(),
            username,
            bio: None,
            avatar_url: None,
            location: None,
            followers_count: 0,
            following_count: 0,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_username(username: &str) -> Result<String, DomainError> {
        let username = username.trim().to_lowercase();
        let valid_len = (3..=30).contains(&username.len());
        let valid_chars = username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid_len || !valid_chars {
            return Err(DomainError::validation(
                "username must be 3-30 characters of letters, digits, '_' or '.'",
            ));
        }
        Ok(username)
    }

    /// Apply a profile edit. Empty optional fields clear the stored value.
    pub fn apply_profile(&mut self, update: ProfileUpdate) -> Result<(), DomainError> {
        if let Some(name) = update.display_name {
            self.display_name = required_text("display_name", &name, 50)?;
        }
        if update.bio.is_some() {
            self.bio = optional_text("bio", update.bio, 280)?;
        }
        if update.avatar_url.is_some() {
            self.avatar_url = optional_text("avatar_url", update.avatar_url, 2048)?;
        }
        if update.location.is_some() {
            self.location = optional_text("location", update.location, 120)?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Ada@Example.com".into(), "Ada_L".into(), "hash".into()).unwrap()
    }

    #[test]
    fn test_new_user_normalises_email_and_username() {
        let user = user();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.username, "ada_l");
        assert_eq!(user.display_name, "ada_l");
        assert_eq!(user.followers_count, 0);
    }

    #[test]
    fn test_new_user_rejects_bad_input() {
        assert!(User::new("nope".into(), "ada".into(), "h".into()).is_err());
        assert!(User::new("a@b.c".into(), "a!".into(), "h".into()).is_err());
    }

    #[test]
    fn test_apply_profile_clears_empty_fields() {
        let mut user = user();
        user.apply_profile(ProfileUpdate {
            display_name: Some("Ada Lovelace".into()),
            bio: Some("Analyst".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(user.display_name, "Ada Lovelace");
        assert_eq!(user.bio.as_deref(), Some("Analyst"));

        user.apply_profile(ProfileUpdate {
            bio: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(user.bio, None);
        assert_eq!(user.display_name, "Ada Lovelace");
    }
}
