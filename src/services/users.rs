//! User management service (admin operations)

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserQuery, UserShort, UserStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        self.repository.users.search(query).await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a user of any role, provisioning the role profile in the same
    /// transaction.
    pub async fn create(&self, data: CreateUser) -> AppResult<User> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.username_exists(&data.username, None).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.users.email_exists(&data.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let profile = data.profile.clone().unwrap_or_default();

        if matches!(data.role, Role::Student | Role::Teacher) && data.profile.is_none() {
            return Err(AppError::Validation(format!(
                "A profile is required when creating a {} account",
                data.role
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(data.password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        let user = self
            .repository
            .users
            .create_with_profile(
                &data.username,
                &data.email,
                &password_hash,
                data.role,
                &data.first_name,
                &data.last_name,
                data.phone.as_deref(),
                data.language.as_deref(),
                &profile,
            )
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Update a user
    pub async fn update(&self, id: i32, data: UpdateUser) -> AppResult<User> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref username) = data.username {
            if self.repository.users.username_exists(username, Some(id)).await? {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }
        if let Some(ref email) = data.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        self.repository.users.update(id, &data).await
    }

    /// Activate or block an account
    pub async fn set_status(&self, id: i32, status: UserStatus) -> AppResult<User> {
        self.repository.users.set_status(id, status.into()).await
    }

    /// Delete a user. Refused while the user has active book loans unless
    /// forced.
    pub async fn delete(&self, id: i32, force: bool) -> AppResult<()> {
        // Existence check first for a clean 404
        self.repository.users.get_by_id(id).await?;

        let active_loans = self.repository.users.active_loan_count(id).await?;
        if active_loans > 0 && !force {
            return Err(AppError::Conflict(format!(
                "User has {} active book loans",
                active_loans
            )));
        }

        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
