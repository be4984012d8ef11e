//! Report generation business logic.
//!
//! This module filters and orders stored payslips for the reports view, checks whether a
//! filtered set covers a single pay period, assembles salary report rows and provides the
//! plain-text formatting helpers used by the command line front end.

use crate::{
    errors::{Error, Result},
    models::{Employee, PayItem, PayPeriod, Payslip},
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Reports view filter. `None` matches every year or month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayslipFilter {
    /// Year to keep
    pub year: Option<i32>,
    /// Month to keep, 1-12
    pub month: Option<u32>,
    /// Case-insensitive substring of the employee name; empty matches everything
    pub search: String,
}

impl PayslipFilter {
    fn matches(&self, payslip: &Payslip) -> bool {
        self.year.is_none_or(|year| payslip.year == year)
            && self.month.is_none_or(|month| payslip.month == month)
            && (self.search.is_empty()
                || payslip
                    .employee_name
                    .to_lowercase()
                    .contains(&self.search.to_lowercase()))
    }
}

/// A payslip enriched with the employee details a salary report shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryReportRow {
    /// The payslip itself
    #[serde(flatten)]
    pub payslip: Payslip,
    /// Employee's allowances
    pub allowances: Vec<PayItem>,
    /// Employee's deductions
    pub deductions: Vec<PayItem>,
    /// Employee code
    pub employee_display_id: String,
    /// Employee department
    pub department: String,
    /// Employee job title
    pub designation: String,
}

/// Payslips matching `filter`, newest period first.
#[must_use]
pub fn filter_payslips<'a>(payslips: &'a [Payslip], filter: &PayslipFilter) -> Vec<&'a Payslip> {
    let mut filtered: Vec<&Payslip> = payslips.iter().filter(|p| filter.matches(p)).collect();
    filtered.sort_by(|a, b| b.year.cmp(&a.year).then(b.month.cmp(&a.month)));
    filtered
}

/// Distinct payslip years, most recent first.
#[must_use]
pub fn available_years(payslips: &[Payslip]) -> Vec<i32> {
    let years: BTreeSet<i32> = payslips.iter().map(|p| p.year).collect();
    years.into_iter().rev().collect()
}

/// The single pay period a set of payslips belongs to.
///
/// Salary reports are only generated per month, so an empty set or one spanning several
/// months is rejected.
pub fn single_period(payslips: &[&Payslip]) -> Result<PayPeriod> {
    let Some(first) = payslips.first() else {
        return Err(Error::validation(
            "There are no payslips in the current filter to save.",
        ));
    };

    if payslips
        .iter()
        .any(|p| p.month != first.month || p.year != first.year)
    {
        return Err(Error::validation(
            "Please filter by a single month and year to generate a report.",
        ));
    }
    first.period()
}

/// Joins payslips with their employee's pay lines and details.
///
/// Payslips of employees that no longer exist keep empty details.
#[must_use]
pub fn salary_report_rows(payslips: &[&Payslip], employees: &[Employee]) -> Vec<SalaryReportRow> {
    payslips
        .iter()
        .map(|payslip| {
            let employee = employees.iter().find(|e| e.id == payslip.employee_id);
            SalaryReportRow {
                payslip: (*payslip).clone(),
                allowances: employee.map(|e| e.allowances.clone()).unwrap_or_default(),
                deductions: employee.map(|e| e.deductions.clone()).unwrap_or_default(),
                employee_display_id: employee.map(|e| e.employee_id.clone()).unwrap_or_default(),
                department: employee.map(|e| e.department.clone()).unwrap_or_default(),
                designation: employee.map(|e| e.designation.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Formats an amount with thousands separators and two decimals, e.g. `12,345.50`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

/// Generates a share bar for visual comparison.
///
/// Creates a text-based bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_share_bar(share_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = share_percent.clamp(0.0, 100.0);

    // clamped ∈ [0, 100] and length is small, so the product fits a usize
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!("[{}{}] {share_percent:.1}%", "█".repeat(filled), "░".repeat(empty))
}

/// Percentage of `part` in `total`, `0` for an empty total.
#[must_use]
pub fn share_percent(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    part / total * 100.0
}

/// One-line summary of a payslip.
#[must_use]
pub fn format_payslip_summary(payslip: &Payslip) -> String {
    let period = payslip
        .period()
        .map_or_else(|_| format!("{}/{}", payslip.month, payslip.year), PayPeriod::label);

    format!(
        "{period} | {} | gross {} | net {} | {:?}",
        payslip.employee_name,
        format_amount(payslip.gross_salary),
        format_amount(payslip.net_salary),
        payslip.status
    )
}
