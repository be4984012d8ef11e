//! Employee model - a person on the payroll.

use serde::{Deserialize, Serialize};

/// A named monetary line on an employee's pay, such as "House Rent" or "Provident Fund".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayItem {
    /// Label of the line (serialized as `type`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Monthly amount
    pub amount: f64,
}

impl PayItem {
    /// Creates a pay line with the given label and amount.
    pub fn new(kind: impl Into<String>, amount: f64) -> Self {
        Self {
            kind: kind.into(),
            amount,
        }
    }
}

/// Monthly allowance paid on top of the basic salary.
pub type Allowance = PayItem;
/// Monthly deduction withheld from the gross salary.
pub type Deduction = PayItem;

/// Sums the amounts of a list of pay lines.
#[must_use]
pub fn sum_items(items: &[PayItem]) -> f64 {
    items.iter().map(|item| item.amount).sum()
}

/// Employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Internal identity, referenced by payslips, overtime records and CVs
    pub id: String,
    /// User-facing code such as `F-101`
    pub employee_id: String,
    /// Full name
    pub name: String,
    /// Department
    #[serde(default)]
    pub department: String,
    /// Job title
    #[serde(default)]
    pub designation: String,
    /// Joining date as entered (`YYYY-MM-DD`)
    #[serde(default)]
    pub joining_date: String,
    /// Monthly basic salary
    #[serde(default)]
    pub basic_salary: f64,
    /// Monthly allowances
    #[serde(default)]
    pub allowances: Vec<Allowance>,
    /// Monthly deductions
    #[serde(default)]
    pub deductions: Vec<Deduction>,
    /// Photo as a data URL, carried opaquely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Employee {
    /// Sum of all allowance amounts.
    #[must_use]
    pub fn total_allowances(&self) -> f64 {
        sum_items(&self.allowances)
    }

    /// Sum of all deduction amounts.
    #[must_use]
    pub fn total_deductions(&self) -> f64 {
        sum_items(&self.deductions)
    }
}
