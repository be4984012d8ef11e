//! Payroll configuration loading from config.toml
//!
//! The file provides the default settings and the employees used to seed the store on
//! first run, when no employee collection has been saved yet.

use crate::{
    core::employee::EmployeeDraft,
    errors::{Error, Result},
    models::{PayItem, Settings},
};
use serde::Deserialize;
use std::path::Path;

/// Config file used when `PAYROLL_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Settings used until the user saves their own
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Employees to seed on first run
    #[serde(default)]
    pub employees: Vec<EmployeeConfig>,
}

/// Default settings. Missing keys take the built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Multiplier applied to the derived hourly rate
    pub overtime_multiplier: Option<f64>,
    /// Fixed hourly overtime rate, `0` for none
    pub overtime_rate: Option<f64>,
    /// Basic salary the derived rate is computed from
    pub overtime_calculation_basic_salary: Option<f64>,
    /// Working days in a month
    pub working_days_per_month: Option<f64>,
    /// Working hours in a day
    pub working_hours_per_day: Option<f64>,
    /// Spreadsheet webhook URL
    pub google_sheets_url: Option<String>,
}

impl SettingsConfig {
    /// Overlays the configured values on the built-in defaults.
    #[must_use]
    pub fn to_settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            overtime_multiplier: self.overtime_multiplier.unwrap_or(defaults.overtime_multiplier),
            overtime_rate: self.overtime_rate.unwrap_or(defaults.overtime_rate),
            overtime_calculation_basic_salary: self
                .overtime_calculation_basic_salary
                .unwrap_or(defaults.overtime_calculation_basic_salary),
            working_days_per_month: self
                .working_days_per_month
                .unwrap_or(defaults.working_days_per_month),
            working_hours_per_day: self
                .working_hours_per_day
                .unwrap_or(defaults.working_hours_per_day),
            google_sheets_url: self
                .google_sheets_url
                .clone()
                .unwrap_or(defaults.google_sheets_url),
        }
    }
}

/// A monetary line in the config file
#[derive(Debug, Deserialize, Clone)]
pub struct PayItemConfig {
    /// Label, e.g. "House Rent"
    pub kind: String,
    /// Monthly amount
    pub amount: f64,
}

/// Configuration for a single seed employee
#[derive(Debug, Deserialize, Clone)]
pub struct EmployeeConfig {
    /// Display code, e.g. `F-101`
    pub employee_id: String,
    /// Full name
    pub name: String,
    /// Department
    #[serde(default)]
    pub department: String,
    /// Job title
    #[serde(default)]
    pub designation: String,
    /// Joining date (`YYYY-MM-DD`)
    #[serde(default)]
    pub joining_date: String,
    /// Monthly basic salary
    pub basic_salary: f64,
    /// Monthly allowances
    #[serde(default)]
    pub allowances: Vec<PayItemConfig>,
    /// Monthly deductions
    #[serde(default)]
    pub deductions: Vec<PayItemConfig>,
}

impl EmployeeConfig {
    /// Form input equivalent of this seed entry.
    #[must_use]
    pub fn to_draft(&self) -> EmployeeDraft {
        let items = |items: &[PayItemConfig]| {
            items
                .iter()
                .map(|item| PayItem::new(item.kind.clone(), item.amount))
                .collect()
        };

        EmployeeDraft {
            employee_id: self.employee_id.clone(),
            name: self.name.clone(),
            department: self.department.clone(),
            designation: self.designation.clone(),
            joining_date: self.joining_date.clone(),
            basic_salary: self.basic_salary,
            allowances: items(&self.allowances),
            deductions: items(&self.deductions),
            photo: None,
        }
    }
}

/// Loads payroll configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.as_ref().display()),
    })?;

    parse_config(&contents)
}

/// Parses payroll configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse payroll config: {e}"),
    })
}

/// Path of the config file, from `PAYROLL_CONFIG` or the default location
#[must_use]
pub fn config_path() -> String {
    std::env::var("PAYROLL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
