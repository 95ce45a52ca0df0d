//! Settings service

use crate::{
    error::AppResult,
    models::setting::{Settings, UpdateSettings},
    repository::Repository,
};

#[derive(Clone)]
pub struct SettingsService {
    repository: Repository,
}

impl SettingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Current settings
    pub async fn get(&self) -> AppResult<Settings> {
        self.repository.settings.load().await
    }

    /// Partial update; numeric circulation rules must stay positive
    pub async fn update(&self, data: UpdateSettings) -> AppResult<Settings> {
        let s = &self.repository.settings;

        if let Some(ref v) = data.school_name {
            s.set("school_name", v).await?;
        }
        if let Some(ref v) = data.academic_year {
            s.set("academic_year", v).await?;
        }
        if let Some(ref v) = data.current_term {
            s.set("current_term", v).await?;
        }
        if let Some(v) = data.loan_period_days {
            s.set_positive("loan_period_days", v).await?;
        }
        if let Some(v) = data.max_loans_per_user {
            s.set_positive("max_loans_per_user", v).await?;
        }
        if let Some(v) = data.max_renewals {
            s.set_non_negative("max_renewals", v).await?;
        }
        if let Some(v) = data.reservation_hold_days {
            s.set_positive("reservation_hold_days", v).await?;
        }

        self.get().await
    }
}
