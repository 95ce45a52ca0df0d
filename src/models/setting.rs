//! System settings model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// School profile settings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchoolSettings {
    pub school_name: String,
    pub academic_year: String,
    pub current_term: String,
}

/// Library circulation rules
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CirculationSettings {
    pub loan_period_days: i64,
    pub max_loans_per_user: i64,
    pub max_renewals: i64,
    pub reservation_hold_days: i64,
}

impl Default for CirculationSettings {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            max_loans_per_user: 3,
            max_renewals: 2,
            reservation_hold_days: 3,
        }
    }
}

/// Full settings payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Settings {
    pub school: SchoolSettings,
    pub circulation: CirculationSettings,
}

/// Partial settings update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettings {
    pub school_name: Option<String>,
    pub academic_year: Option<String>,
    pub current_term: Option<String>,
    pub loan_period_days: Option<i64>,
    pub max_loans_per_user: Option<i64>,
    pub max_renewals: Option<i64>,
    pub reservation_hold_days: Option<i64>,
}
