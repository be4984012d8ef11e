//! Overtime record model - one logged instance of extra hours worked.

use super::round_to_cents;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for overtime dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One employee worked `hours` on `date` at `rate`, optionally covering for an absent colleague.
///
/// `total_amount` always equals `round(hours * rate, 2)`; mutate hours and rate through
/// [`OvertimeRecord::set_hours`] and [`OvertimeRecord::set_rate`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRecord {
    /// Record id
    pub id: String,
    /// Internal id of the employee who worked the hours
    pub employee_id: String,
    /// User-facing code of that employee
    #[serde(default)]
    pub employee_display_id: String,
    /// Name of the employee at the time
    #[serde(default)]
    pub employee_name: String,
    /// Their department
    #[serde(default)]
    pub department: String,
    /// Their job title
    #[serde(default)]
    pub designation: String,
    /// Date as stored (`YYYY-MM-DD`); imported data may carry anything here
    #[serde(default)]
    pub date: String,
    /// Hours worked
    pub hours: f64,
    /// Hourly rate, rounded to cents
    pub rate: f64,
    /// `hours * rate`, rounded to cents
    pub total_amount: f64,
    /// Internal id of the absent employee covered for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absent_employee_id: Option<String>,
    /// Name of the absent person covered for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absent_employee_name: Option<String>,
}

impl OvertimeRecord {
    /// Parsed date, `None` when the stored value is missing or malformed.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }

    /// Sets the hours (negative values clamp to zero) and recomputes the total.
    pub fn set_hours(&mut self, hours: f64) {
        self.hours = clamp_hours(hours);
        self.recompute_total();
    }

    /// Sets the rate and recomputes the total.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate.max(0.0);
        self.recompute_total();
    }

    /// Restores the `total_amount = round(hours * rate, 2)` invariant.
    pub fn recompute_total(&mut self) {
        self.total_amount = round_to_cents(self.hours * self.rate);
    }

    /// Absent employee id, treating an empty string as absent.
    #[must_use]
    pub fn absent_id(&self) -> Option<&str> {
        non_empty(self.absent_employee_id.as_deref())
    }

    /// Absent employee name, treating an empty string as absent.
    #[must_use]
    pub fn absent_name(&self) -> Option<&str> {
        non_empty(self.absent_employee_name.as_deref())
    }
}

/// Negative hours are clamped, not rejected.
#[must_use]
pub fn clamp_hours(hours: f64) -> f64 {
    if hours.is_finite() { hours.max(0.0) } else { 0.0 }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
