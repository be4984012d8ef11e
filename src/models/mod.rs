//! Domain models - the flat collections the application owns and persists.
//!
//! Every type serializes with camelCase field names so the stored JSON documents
//! keep the same shape as the exported data bundle.

/// Employee CVs
pub mod cv;
/// Employees and pay items
pub mod employee;
/// Notes board
pub mod note;
/// Overtime records
pub mod overtime;
/// Payslips
pub mod payslip;
/// Pay periods
pub mod period;
/// Payroll settings
pub mod settings;

pub use cv::{CvField, CvItem, CvLayout, CvListItem, CvSection, CvSide, EmployeeCv};
pub use employee::{Allowance, Deduction, Employee, PayItem};
pub use note::Note;
pub use overtime::OvertimeRecord;
pub use payslip::{Payslip, PayslipStatus};
pub use period::PayPeriod;
pub use settings::Settings;

/// Rounds a monetary amount to two decimal places.
#[must_use]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(79.166_666), 79.17);
        assert_eq!(round_to_cents(12.344), 12.34);
        assert_eq!(round_to_cents(0.0), 0.0);
        assert_eq!(round_to_cents(158.333_333_3), 158.33);
    }
}
