//! Settings repository: key/value store with typed accessors

use std::collections::HashMap;

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::setting::{CirculationSettings, SchoolSettings, Settings},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Postgres>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All settings as a key/value map
    pub async fn get_all(&self) -> AppResult<HashMap<String, String>> {
        let rows = sqlx::query("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get::<String, _>("key"), r.get::<String, _>("value")))
            .collect())
    }

    /// Typed settings payload
    pub async fn load(&self) -> AppResult<Settings> {
        let map = self.get_all().await?;
        let defaults = CirculationSettings::default();

        let get_i64 = |key: &str, default: i64| -> i64 {
            map.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
        };
        let get_str = |key: &str, default: &str| -> String {
            map.get(key).cloned().unwrap_or_else(|| default.to_string())
        };

        Ok(Settings {
            school: SchoolSettings {
                school_name: get_str("school_name", "Ardesia School"),
                academic_year: get_str("academic_year", ""),
                current_term: get_str("current_term", ""),
            },
            circulation: CirculationSettings {
                loan_period_days: get_i64("loan_period_days", defaults.loan_period_days),
                max_loans_per_user: get_i64("max_loans_per_user", defaults.max_loans_per_user),
                max_renewals: get_i64("max_renewals", defaults.max_renewals),
                reservation_hold_days: get_i64("reservation_hold_days", defaults.reservation_hold_days),
            },
        })
    }

    /// Circulation rules only (hot path for the loans service)
    pub async fn circulation(&self) -> AppResult<CirculationSettings> {
        Ok(self.load().await?.circulation)
    }

    /// Update-or-insert one setting
    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let rows_affected = sqlx::query(
            "UPDATE settings SET value = $2, updated_at = NOW() WHERE key = $1",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            sqlx::query("INSERT INTO settings (key, value) VALUES ($1, $2)")
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Set a numeric setting, rejecting non-positive values
    pub async fn set_positive(&self, key: &str, value: i64) -> AppResult<()> {
        if value <= 0 {
            return Err(AppError::Validation(format!("{} must be positive", key)));
        }
        self.set(key, &value.to_string()).await
    }

    /// Set a numeric setting that may be zero (e.g. max_renewals)
    pub async fn set_non_negative(&self, key: &str, value: i64) -> AppResult<()> {
        if value < 0 {
            return Err(AppError::Validation(format!("{} cannot be negative", key)));
        }
        self.set(key, &value.to_string()).await
    }
}
