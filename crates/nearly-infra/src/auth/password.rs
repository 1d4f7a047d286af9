//! Argon2 password hashing, password policy and reset codes.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::{OsRng, RngCore},
    },
};

use nearly_core::ports::{AuthError, PasswordService};

pub const DEFAULT_MIN_PASSWORD_LEN: usize = 8;

/// Upper bound keeps a single login from pinning a core on Argon2.
const MAX_PASSWORD_LEN: usize = 128;

/// Argon2id password service with the crate's default cost parameters.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
    min_length: usize,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::with_min_length(DEFAULT_MIN_PASSWORD_LEN)
    }

    pub fn with_min_length(min_length: usize) -> Self {
        Self {
            argon2: Argon2::default(),
            min_length,
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &stored)
            .is_ok())
    }

    fn check_policy(&self, password: &str) -> Result<(), AuthError> {
        let chars = password.chars().count();
        if chars < self.min_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }
        if chars > MAX_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at most {MAX_PASSWORD_LEN} characters"
            )));
        }
        if password.trim().is_empty() {
            return Err(AuthError::WeakPassword(
                "Password cannot be only whitespace".to_string(),
            ));
        }
        Ok(())
    }

    fn one_time_code(&self) -> String {
        format!("{:06}", OsRng.next_u32() % 1_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = Argon2PasswordService::new();
        let hash = service.hash("correct-horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("correct-horse", &hash).unwrap());
        assert!(!service.verify("battery-staple", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_a_fresh_salt() {
        let service = Argon2PasswordService::new();
        assert_ne!(
            service.hash("nearly-demo").unwrap(),
            service.hash("nearly-demo").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let service = Argon2PasswordService::new();
        let result = service.verify("password", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::HashingError(_))));
    }

    #[test]
    fn test_policy_counts_chars_not_bytes() {
        let service = Argon2PasswordService::new();
        assert!(service.check_policy("long enough").is_ok());
        assert!(matches!(
            service.check_policy("short"),
            Err(AuthError::WeakPassword(_))
        ));
        // Seven chars, fourteen bytes.
        assert!(service.check_policy("ééééééé").is_err());
        assert!(service.check_policy("        ").is_err());
        assert!(service.check_policy(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_one_time_code_is_six_digits() {
        let service = Argon2PasswordService::with_min_length(4);
        for _ in 0..50 {
            let code = service.one_time_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
