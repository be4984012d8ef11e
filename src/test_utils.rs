//! Shared test utilities for the payroll crate.
//!
//! This module provides helpers for setting up test databases and for building
//! domain records with sensible defaults.

use crate::{
    core::state::AppState,
    errors::Result,
    models::{Employee, OvertimeRecord, PayItem, PayPeriod, Payslip, PayslipStatus, payslip},
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all storage tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test employee with sensible defaults.
///
/// # Defaults
/// * `employee_id`: `F-` followed by the id without its `emp-` prefix
/// * `department`: "Production"
/// * `designation`: "Machine Operator"
/// * `joining_date`: "2022-01-15"
/// * no allowances, deductions or photo
#[must_use]
pub fn test_employee(id: &str, name: &str, basic_salary: f64) -> Employee {
    Employee {
        id: id.to_string(),
        employee_id: format!("F-{}", id.trim_start_matches("emp-")),
        name: name.to_string(),
        department: "Production".to_string(),
        designation: "Machine Operator".to_string(),
        joining_date: "2022-01-15".to_string(),
        basic_salary,
        allowances: Vec::new(),
        deductions: Vec::new(),
        photo: None,
    }
}

/// Creates a test employee with allowances and deductions.
#[must_use]
pub fn test_employee_with_items(
    id: &str,
    name: &str,
    basic_salary: f64,
    allowances: &[(&str, f64)],
    deductions: &[(&str, f64)],
) -> Employee {
    let mut employee = test_employee(id, name, basic_salary);
    employee.allowances = allowances
        .iter()
        .map(|(kind, amount)| PayItem::new(*kind, *amount))
        .collect();
    employee.deductions = deductions
        .iter()
        .map(|(kind, amount)| PayItem::new(*kind, *amount))
        .collect();
    employee
}

/// Creates a test overtime record with no absentee.
/// The total is derived from hours and rate.
#[must_use]
pub fn test_overtime_record(
    id: &str,
    employee_id: &str,
    date: &str,
    hours: f64,
    rate: f64,
) -> OvertimeRecord {
    let mut record = OvertimeRecord {
        id: id.to_string(),
        employee_id: employee_id.to_string(),
        employee_display_id: format!("F-{}", employee_id.trim_start_matches("emp-")),
        employee_name: format!("Worker {employee_id}"),
        department: "Production".to_string(),
        designation: "Machine Operator".to_string(),
        date: date.to_string(),
        hours,
        rate,
        total_amount: 0.0,
        absent_employee_id: None,
        absent_employee_name: None,
    };
    record.recompute_total();
    record
}

/// Creates a test overtime record covering for an absent person.
#[must_use]
pub fn test_absence_record(
    id: &str,
    employee_id: &str,
    date: &str,
    hours: f64,
    rate: f64,
    absent_id: Option<&str>,
    absent_name: Option<&str>,
) -> OvertimeRecord {
    let mut record = test_overtime_record(id, employee_id, date, hours, rate);
    record.absent_employee_id = absent_id.map(str::to_string);
    record.absent_employee_name = absent_name.map(str::to_string);
    record
}

/// Creates a pending test payslip whose net salary equals `net`
/// (basic salary `net`, every other component zero).
///
/// # Panics
/// Panics on an invalid month.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_payslip(employee_id: &str, year: i32, month: u32, net: f64) -> Payslip {
    let period = PayPeriod::new(year, month).unwrap();
    let mut slip = Payslip {
        id: payslip::payslip_id(employee_id, period),
        employee_id: employee_id.to_string(),
        employee_name: format!("Worker {employee_id}"),
        month,
        year,
        basic_salary: net,
        total_allowances: 0.0,
        total_deductions: 0.0,
        overtime_pay: 0.0,
        absent_deduction: 0.0,
        gross_salary: 0.0,
        net_salary: 0.0,
        status: PayslipStatus::Pending,
    };
    slip.recompute();
    slip
}

/// Sets up an application state with three employees mirroring the demo factory.
/// Returns the state; employees are `emp-001` (Rahim), `emp-002` (Karim), `emp-003` (Fatema).
#[must_use]
pub fn setup_with_employees() -> AppState {
    let mut state = AppState::default();
    state.employees = vec![
        test_employee_with_items(
            "emp-001",
            "Rahim Sheikh",
            15000.0,
            &[("House Rent", 3000.0), ("Medical", 1000.0), ("Transport", 500.0)],
            &[("Provident Fund", 1200.0), ("Food", 1500.0)],
        ),
        test_employee_with_items(
            "emp-002",
            "Karim Mia",
            12000.0,
            &[("House Rent", 2500.0), ("Medical", 800.0), ("Transport", 400.0)],
            &[("Provident Fund", 1000.0), ("Food", 1500.0)],
        ),
        test_employee_with_items(
            "emp-003",
            "Fatema Begum",
            18000.0,
            &[("House Rent", 4000.0), ("Medical", 1200.0), ("Transport", 600.0)],
            &[("Provident Fund", 1500.0), ("Food", 1500.0)],
        ),
    ];
    state
}
