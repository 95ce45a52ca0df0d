//! Users repository for database operations

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, RoleProfile, UpdateProfile, UpdateUser, User, UserQuery, UserShort},
};

use super::{normalize_search, page_bounds};

/// Refresh token row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRow {
    pub id: i32,
    pub user_id: i32,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username or email (login lookup)
    pub async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1) AND id != $2)")
                .bind(username)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != $2)")
                .bind(email)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", normalize_search(search)));
            let n = params.len();
            conditions.push(format!(
                "(LOWER(username) LIKE ${n} OR LOWER(email) LIKE ${n} OR LOWER(first_name) LIKE ${n} OR LOWER(last_name) LIKE ${n})"
            ));
        }

        if let Some(role) = query.role {
            params.push(role.as_str().to_string());
            conditions.push(format!("role = ${}", params.len()));
        }

        let status_cond = query.status.map(|s| format!("status = {}", s));
        if let Some(c) = status_cond {
            conditions.push(c);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &params {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT id, username, first_name, last_name, role FROM users {} ORDER BY last_name, first_name LIMIT ${} OFFSET ${}",
            where_clause,
            params.len() + 1,
            params.len() + 2
        );
        let mut list_query = sqlx::query_as::<_, UserShort>(&list_sql);
        for p in &params {
            list_query = list_query.bind(p);
        }
        let users = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    /// Create a user plus its role profile inside one transaction.
    /// Any failure (duplicate roll number, bad date) rolls the user row back too.
    pub async fn create_with_profile(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        language: Option<&str>,
        profile: &RoleProfile,
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, first_name, last_name, phone, language)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .bind(language)
        .fetch_one(&mut *tx)
        .await?;

        match role {
            Role::Student => {
                let roll_number = match profile.roll_number {
                    Some(ref r) => r.clone(),
                    None => {
                        // Next sequential roll number, e.g. S-2025-0042
                        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
                            .fetch_one(&mut *tx)
                            .await?;
                        format!("S-{}-{:04}", Utc::now().format("%Y"), count + 1)
                    }
                };
                let class_level = profile
                    .class_level
                    .clone()
                    .ok_or_else(|| AppError::Validation("class_level is required for students".to_string()))?;
                let admission_date = parse_date_or_today(profile.admission_date.as_deref(), "admission_date")?;

                sqlx::query(
                    r#"
                    INSERT INTO students (user_id, roll_number, class_level, section, admission_date)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(user.id)
                .bind(&roll_number)
                .bind(&class_level)
                .bind(&profile.section)
                .bind(admission_date)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_unique_violation(e, "Roll number already exists"))?;
            }
            Role::Teacher => {
                let employee_id = profile
                    .employee_id
                    .clone()
                    .ok_or_else(|| AppError::Validation("employee_id is required for teachers".to_string()))?;
                let hire_date = parse_date_or_today(profile.hire_date.as_deref(), "hire_date")?;

                sqlx::query(
                    r#"
                    INSERT INTO teachers (user_id, employee_id, department, qualification, hire_date)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(user.id)
                .bind(&employee_id)
                .bind(&profile.department)
                .bind(&profile.qualification)
                .bind(hire_date)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_unique_violation(e, "Employee ID already exists"))?;
            }
            Role::Parent => {
                sqlx::query("INSERT INTO parents (user_id, occupation) VALUES ($1, $2)")
                    .bind(user.id)
                    .bind(&profile.occupation)
                    .execute(&mut *tx)
                    .await?;
            }
            Role::Admin | Role::Librarian => {}
        }

        tx.commit().await?;
        Ok(user)
    }

    /// Update a user (admin fields)
    pub async fn update(&self, id: i32, data: &UpdateUser) -> AppResult<User> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut params: Vec<String> = Vec::new();

        if let Some(ref v) = data.username { params.push(v.clone()); sets.push(format!("username = ${}", params.len() + 1)); }
        if let Some(ref v) = data.email { params.push(v.clone()); sets.push(format!("email = ${}", params.len() + 1)); }
        if let Some(ref v) = data.first_name { params.push(v.clone()); sets.push(format!("first_name = ${}", params.len() + 1)); }
        if let Some(ref v) = data.last_name { params.push(v.clone()); sets.push(format!("last_name = ${}", params.len() + 1)); }
        if let Some(ref v) = data.phone { params.push(v.clone()); sets.push(format!("phone = ${}", params.len() + 1)); }
        if let Some(ref v) = data.language { params.push(v.clone()); sets.push(format!("language = ${}", params.len() + 1)); }

        let sql = format!(
            "UPDATE users SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );

        let mut query = sqlx::query_as::<_, User>(&sql).bind(now);
        for p in &params {
            query = query.bind(p);
        }

        query
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Update password hash
    pub async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update own profile fields (subset of update)
    pub async fn update_profile(&self, id: i32, data: &UpdateProfile) -> AppResult<User> {
        let update = UpdateUser {
            username: None,
            email: data.email.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            phone: data.phone.clone(),
            language: data.language.clone(),
        };
        self.update(id, &update).await
    }

    /// Set account status (0 = active, 1 = blocked)
    pub async fn set_status(&self, id: i32, status: i16) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Record a successful login
    pub async fn touch_last_login(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Count of active (non-returned) book loans held by a user
    pub async fn active_loan_count(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE user_id = $1 AND status = 'active'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Delete a user (role profile rows cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    // ---- Refresh tokens ----

    /// Store a refresh token hash for a user
    pub async fn insert_refresh_token(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Look up a refresh token by its hash
    pub async fn get_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRow>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT id, user_id, token_hash, expires_at, revoked_at FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Revoke a refresh token (idempotent)
    pub async fn revoke_refresh_token(&self, token_hash: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Users holding a given role (for broadcasts)
    pub async fn ids_by_role(&self, role: Option<Role>) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = if let Some(role) = role {
            sqlx::query("SELECT id FROM users WHERE role = $1 AND status = 0")
                .bind(role)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|r| r.get("id"))
                .collect()
        } else {
            sqlx::query("SELECT id FROM users WHERE status = 0")
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|r| r.get("id"))
                .collect()
        };
        Ok(ids)
    }
}

/// Map a unique-constraint violation to a Conflict with a friendly message
fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(message.to_string());
        }
    }
    AppError::Database(e)
}

fn parse_date_or_today(value: Option<&str>, field: &str) -> AppResult<NaiveDate> {
    match value {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("Invalid {} (use YYYY-MM-DD)", field))),
        None => Ok(Utc::now().date_naive()),
    }
}
