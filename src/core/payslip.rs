//! Salary processing business logic.
//!
//! A batch is prepared for a calendar month by computing a pending payslip for every
//! employee from their basic salary, allowances, deductions, that month's overtime, and
//! the absence deduction funded by colleagues who covered for them. Finalizing the batch
//! marks it processed and upserts it into the stored payslips by
//! `(employeeId, month, year)`, so reprocessing a month replaces rather than duplicates.

use super::{absence, overtime};
use crate::{
    errors::{Error, Result},
    models::{
        Employee, OvertimeRecord, PayItem, PayPeriod, Payslip, PayslipStatus,
        employee::sum_items, payslip::payslip_id,
    },
};
use std::collections::HashSet;
use tracing::info;

/// Manually edited components of a pending payslip.
///
/// Gross and net are deliberately absent: they are always re-derived.
#[derive(Debug, Clone, PartialEq)]
pub struct PayslipEdit {
    /// New basic salary
    pub basic_salary: f64,
    /// New allowances
    pub allowances: Vec<PayItem>,
    /// New deductions
    pub deductions: Vec<PayItem>,
}

/// Computes one employee's pending payslip for a month.
#[must_use]
pub fn compute_payslip(
    employee: &Employee,
    period_overtime_total: f64,
    period_absence_deduction: f64,
    period: PayPeriod,
) -> Payslip {
    let mut payslip = Payslip {
        id: payslip_id(&employee.id, period),
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        month: period.month(),
        year: period.year(),
        basic_salary: employee.basic_salary,
        total_allowances: employee.total_allowances(),
        total_deductions: employee.total_deductions(),
        overtime_pay: period_overtime_total,
        absent_deduction: period_absence_deduction,
        gross_salary: 0.0,
        net_salary: 0.0,
        status: PayslipStatus::Pending,
    };
    payslip.recompute();
    payslip
}

/// Computes a pending payslip for every employee for the given month.
#[must_use]
pub fn prepare_batch(
    employees: &[Employee],
    overtime_records: &[OvertimeRecord],
    period: PayPeriod,
) -> Vec<Payslip> {
    let absence_deductions = absence::monthly_absence_deductions(overtime_records, period);

    employees
        .iter()
        .map(|employee| {
            let overtime = overtime::aggregate_for_period(overtime_records, &employee.id, period);
            let absent = absence::absence_deduction_for(employee, &absence_deductions);
            compute_payslip(employee, overtime.total_pay, absent, period)
        })
        .collect()
}

/// Drops one payslip from a batch before it is finalized.
pub fn remove_from_batch(batch: &[Payslip], payslip_id: &str) -> Result<Vec<Payslip>> {
    if !batch.iter().any(|p| p.id == payslip_id) {
        return Err(Error::PayslipNotFound {
            id: payslip_id.to_string(),
        });
    }
    Ok(batch.iter().filter(|p| p.id != payslip_id).cloned().collect())
}

/// Applies a manual edit, re-deriving totals, gross and net.
#[must_use]
pub fn apply_edit(payslip: &Payslip, edit: &PayslipEdit) -> Payslip {
    let mut edited = payslip.clone();
    edited.basic_salary = edit.basic_salary;
    edited.total_allowances = sum_items(&edit.allowances);
    edited.total_deductions = sum_items(&edit.deductions);
    edited.recompute();
    edited
}

/// Replaces one payslip of a batch with its edited version.
pub fn edit_in_batch(batch: &[Payslip], payslip_id: &str, edit: &PayslipEdit) -> Result<Vec<Payslip>> {
    if !batch.iter().any(|p| p.id == payslip_id) {
        return Err(Error::PayslipNotFound {
            id: payslip_id.to_string(),
        });
    }
    let amounts = std::iter::once(edit.basic_salary)
        .chain(edit.allowances.iter().map(|item| item.amount))
        .chain(edit.deductions.iter().map(|item| item.amount));
    for amount in amounts {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::validation(format!(
                "Payslip amounts must be non-negative, got {amount}"
            )));
        }
    }
    Ok(batch
        .iter()
        .map(|p| if p.id == payslip_id { apply_edit(p, edit) } else { p.clone() })
        .collect())
}

/// Marks a batch processed and upserts it into the stored payslips.
///
/// Stored payslips sharing an `(employeeId, month, year)` key with the batch are dropped;
/// the batch is appended after the survivors.
#[must_use]
pub fn finalize_batch(existing: &[Payslip], batch: &[Payslip]) -> Vec<Payslip> {
    let replaced: HashSet<(&str, u32, i32)> = batch.iter().map(Payslip::key).collect();

    let mut payslips: Vec<Payslip> = existing
        .iter()
        .filter(|p| !replaced.contains(&p.key()))
        .cloned()
        .collect();
    let replaced_count = existing.len() - payslips.len();

    payslips.extend(batch.iter().map(|p| Payslip {
        status: PayslipStatus::Processed,
        ..p.clone()
    }));

    info!(
        processed = batch.len(),
        replaced = replaced_count,
        "Finalized salary batch"
    );
    payslips
}
