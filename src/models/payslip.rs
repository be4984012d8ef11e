//! Payslip model - one employee's pay breakdown for one calendar month.

use super::PayPeriod;
use crate::errors::Result;
use serde::{Deserialize, Serialize};

/// Processing state of a payslip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PayslipStatus {
    /// Calculated but not yet part of a finalized batch
    #[default]
    Pending,
    /// Finalized with its batch
    Processed,
}

/// Payslip record. Gross and net are always derived from the component fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    /// See [`payslip_id`]
    pub id: String,
    /// Internal id of the employee
    pub employee_id: String,
    /// Employee name at processing time
    pub employee_name: String,
    /// Calendar month, 1-12
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// Basic salary
    pub basic_salary: f64,
    /// Sum of allowances
    pub total_allowances: f64,
    /// Sum of deductions
    pub total_deductions: f64,
    /// Overtime pay for the month
    pub overtime_pay: f64,
    /// Overtime paid to colleagues covering this employee's absences
    #[serde(default)]
    pub absent_deduction: f64,
    /// Basic plus allowances plus overtime
    pub gross_salary: f64,
    /// Gross minus deductions
    pub net_salary: f64,
    /// Processing status
    #[serde(default)]
    pub status: PayslipStatus,
}

/// Builds the identifier every payslip for `(employee, period)` carries.
#[must_use]
pub fn payslip_id(employee_id: &str, period: PayPeriod) -> String {
    format!("payslip-{employee_id}-{}-{}", period.month(), period.year())
}

impl Payslip {
    /// The `(employeeId, month, year)` key a payslip is unique under.
    #[must_use]
    pub fn key(&self) -> (&str, u32, i32) {
        (&self.employee_id, self.month, self.year)
    }

    /// Pay period of this payslip, rejecting malformed stored months.
    pub fn period(&self) -> Result<PayPeriod> {
        PayPeriod::new(self.year, self.month)
    }

    /// Re-derives gross and net salary from the component fields.
    pub fn recompute(&mut self) {
        self.gross_salary = self.basic_salary + self.total_allowances + self.overtime_pay;
        self.net_salary = self.gross_salary - self.total_deductions - self.absent_deduction;
    }

    /// Everything withheld from this payslip.
    #[must_use]
    pub fn withheld(&self) -> f64 {
        self.total_deductions + self.absent_deduction
    }
}
