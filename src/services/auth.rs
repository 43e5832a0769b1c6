//! Authentication and user accounts

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, User, UserClaims, UserShort},
    repository::Repository,
};

/// Hash a password with argon2 and a random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored argon2 hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate and open a new session
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, UserClaims, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .filter(|u| verify_password(password, &u.password_hash))
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        let claims = UserClaims::new(&user, self.config.jwt_expiration_hours);
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!("User {} logged in (session {})", user.username, claims.sid);
        Ok((token, claims, user))
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn create_user(&self, data: CreateUser) -> AppResult<UserShort> {
        data.validate()?;
        let hash = hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(
                data.username.trim(),
                &hash,
                data.first_name.trim(),
                data.last_name.trim(),
                data.role,
            )
            .await?;

        tracing::info!("User created: id={} role={}", user.id, user.role);
        Ok(user.into())
    }

    /// Create the configured librarian account when no user exists yet
    pub async fn bootstrap_librarian(&self) -> AppResult<()> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_username.as_deref(),
            self.config.bootstrap_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.count().await? > 0 {
            return Ok(());
        }

        let hash = hash_password(password)?;
        self.repository
            .users
            .create(username, &hash, "", "", Role::Librarian)
            .await?;

        tracing::warn!("Created bootstrap librarian account '{}'", username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("s3cret", "not-a-hash"));
    }
}
