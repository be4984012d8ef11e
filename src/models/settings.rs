//! Global settings - overtime rate configuration and the spreadsheet webhook URL.

use serde::{Deserialize, Serialize};

/// Application-wide settings.
///
/// Missing fields fall back to their defaults field by field, so settings saved by an
/// older version or imported from a partial bundle still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Multiplier applied to the derived hourly rate
    pub overtime_multiplier: f64,
    /// Fixed hourly overtime rate; `0` disables the override
    pub overtime_rate: f64,
    /// Basic salary the derived hourly rate is computed from
    pub overtime_calculation_basic_salary: f64,
    /// Working days in a month
    pub working_days_per_month: f64,
    /// Working hours in a day
    pub working_hours_per_day: f64,
    /// Spreadsheet webhook; empty when not configured
    pub google_sheets_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            overtime_multiplier: 2.0,
            overtime_rate: 0.0,
            overtime_calculation_basic_salary: 9500.0,
            working_days_per_month: 30.0,
            working_hours_per_day: 8.0,
            google_sheets_url: String::new(),
        }
    }
}

impl Settings {
    /// Configured webhook URL, `None` when blank.
    #[must_use]
    pub fn webhook_url(&self) -> Option<&str> {
        let url = self.google_sheets_url.trim();
        (!url.is_empty()).then_some(url)
    }
}
