//! Authentication service: login, signup provisioning, token lifecycle

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{Role, RoleProfile, UpdateProfile, User, UserClaims},
    repository::Repository,
};

/// Access token plus the opaque refresh token handed to the client
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Self-service registration payload
#[derive(Debug, serde::Deserialize, Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// student or parent (staff accounts are created by an administrator)
    pub role: Role,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    #[validate(nested)]
    pub profile: Option<RoleProfile>,
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

    /// Provision the bootstrap admin account on first start.
    /// The password comes from ARDESIA_ADMIN_PASSWORD, defaulting to "admin"
    /// for development setups.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.users.get_by_login("admin").await?.is_some() {
            return Ok(());
        }

        let password = std::env::var("ARDESIA_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
        let password_hash = self.hash_password(&password)?;

        self.repository
            .users
            .create_with_profile(
                "admin",
                "admin@ardesia.school",
                &password_hash,
                Role::Admin,
                "System",
                "Administrator",
                None,
                None,
                &RoleProfile::default(),
            )
            .await?;

        tracing::warn!("Bootstrap admin account created; change its password");
        Ok(())
    }

    /// Authenticate by username/email + password, returning a token pair
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<(TokenPair, User)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login or password".to_string()))?;

        if user.is_blocked() {
            return Err(AppError::Authentication("Account is blocked".to_string()));
        }

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid login or password".to_string()));
        }

        self.repository.users.touch_last_login(user.id).await?;

        let tokens = self.issue_tokens(&user).await?;
        Ok((tokens, user))
    }

    /// Self-service signup. Only student and parent accounts may be created
    /// this way; the user row and its role profile are provisioned in one
    /// transaction.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<(TokenPair, User)> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if !matches!(request.role, Role::Student | Role::Parent) {
            return Err(AppError::Authorization(
                "Only student and parent accounts can self-register".to_string(),
            ));
        }

        if self.repository.users.username_exists(&request.username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.users.email_exists(&request.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let profile = request.profile.unwrap_or_default();

        let user = self
            .repository
            .users
            .create_with_profile(
                &request.username,
                &request.email,
                &password_hash,
                request.role,
                &request.first_name,
                &request.last_name,
                request.phone.as_deref(),
                None,
                &profile,
            )
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "New account registered");

        let tokens = self.issue_tokens(&user).await?;
        Ok((tokens, user))
    }

    /// Rotate a refresh token: revoke the presented one, issue a new pair
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(TokenPair, User)> {
        let hash = hash_refresh_token(refresh_token);

        let row = self
            .repository
            .users
            .get_refresh_token(&hash)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid refresh token".to_string()))?;

        if row.revoked_at.is_some() {
            return Err(AppError::Authentication("Refresh token has been revoked".to_string()));
        }
        if row.expires_at < Utc::now() {
            return Err(AppError::Authentication("Refresh token has expired".to_string()));
        }

        let user = self.repository.users.get_by_id(row.user_id).await?;
        if user.is_blocked() {
            return Err(AppError::Authentication("Account is blocked".to_string()));
        }

        self.repository.users.revoke_refresh_token(&hash).await?;

        let tokens = self.issue_tokens(&user).await?;
        Ok((tokens, user))
    }

    /// Revoke a refresh token (idempotent)
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let hash = hash_refresh_token(refresh_token);
        self.repository.users.revoke_refresh_token(&hash).await
    }

    /// Current user from claims
    pub async fn me(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository.users.get_by_id(claims.user_id).await
    }

    /// Self-service profile update. Changing the password requires the
    /// current one.
    pub async fn update_profile(&self, user_id: i32, data: UpdateProfile) -> AppResult<User> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self.repository.users.get_by_id(user_id).await?;

        if let Some(ref email) = data.email {
            if self.repository.users.email_exists(email, Some(user_id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        if let Some(ref new_password) = data.new_password {
            let current = data
                .current_password
                .as_deref()
                .ok_or_else(|| AppError::BadRequest("current_password is required to change the password".to_string()))?;
            if !self.verify_password(&user, current)? {
                return Err(AppError::Authentication("Current password is incorrect".to_string()));
            }
            let hash = self.hash_password(new_password)?;
            self.repository.users.update_password(user_id, &hash).await?;
        }

        self.repository.users.update_profile(user_id, &data).await
    }

    /// Hash a password with argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Issue an access JWT and a fresh opaque refresh token
    async fn issue_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let now = Utc::now().timestamp();
        let expires_in = self.config.jwt_expiration_hours as i64 * 3600;

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp: now + expires_in,
            iat: now,
        };

        let access_token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        let refresh_token = generate_refresh_token();
        let expires_at = Utc::now() + Duration::days(self.config.refresh_expiration_days as i64);
        self.repository
            .users
            .insert_refresh_token(user.id, &hash_refresh_token(&refresh_token), expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in,
        })
    }
}

/// Opaque 256-bit refresh token, hex-encoded
fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Refresh tokens are stored as SHA-256 hex digests
fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_unique_and_opaque() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn token_hash_is_stable() {
        let t = "deadbeef";
        assert_eq!(hash_refresh_token(t), hash_refresh_token(t));
        assert_ne!(hash_refresh_token(t), hash_refresh_token("deadbeee"));
        assert_eq!(hash_refresh_token(t).len(), 64);
    }
}
