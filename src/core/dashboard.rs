//! Dashboard aggregation.
//!
//! Cross-cuts payslips and overtime records into headline totals, the three top
//! performers, a six-month trailing payout series and a department distribution.

use super::overtime;
use crate::models::{Employee, OvertimeRecord, PayPeriod, Payslip};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Name reported when there is no top performer.
pub const NO_PERFORMER: &str = "N/A";

/// Department reported for employees without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Number of months in the trailing payout series.
pub const SERIES_MONTHS: usize = 6;

/// The employee with the highest total in some category.
#[derive(Debug, Clone, PartialEq)]
pub struct TopPerformer {
    /// Internal id of the winner, `None` when nobody qualifies
    pub employee_id: Option<String>,
    /// Display name, or `N/A`
    pub name: String,
    /// Winning total
    pub amount: f64,
}

impl TopPerformer {
    fn none() -> Self {
        Self {
            employee_id: None,
            name: NO_PERFORMER.to_string(),
            amount: 0.0,
        }
    }
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Number of employees
    pub total_employees: usize,
    /// Number of stored payslips
    pub payslips_generated: usize,
    /// Sum of every payslip's net salary
    pub total_salary_paid: f64,
    /// Sum of every overtime record's total amount
    pub total_overtime: f64,
    /// Sum of every payslip's deductions plus absence deduction
    pub total_deductions: f64,
    /// Highest total net salary
    pub top_salary_earner: TopPerformer,
    /// Highest total overtime pay
    pub top_overtime_earner: TopPerformer,
    /// Highest total absence deduction
    pub top_deduction_person: TopPerformer,
}

/// Net salary paid out in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPayout {
    /// Month of the payout
    pub period: PayPeriod,
    /// Short label such as `Mar 24`
    pub label: String,
    /// Net salary paid that month
    pub total: f64,
}

/// Computes the dashboard figures from the full collections.
#[must_use]
pub fn dashboard_stats(
    employees: &[Employee],
    payslips: &[Payslip],
    overtime_records: &[OvertimeRecord],
) -> DashboardStats {
    let total_salary_paid = payslips.iter().map(|p| p.net_salary).sum();
    let total_deductions = payslips.iter().map(Payslip::withheld).sum();

    DashboardStats {
        total_employees: employees.len(),
        payslips_generated: payslips.len(),
        total_salary_paid,
        total_overtime: overtime::aggregate_all(overtime_records),
        total_deductions,
        top_salary_earner: top_performer(
            employees,
            payslips.iter().map(|p| (p.employee_id.as_str(), p.net_salary)),
        ),
        top_overtime_earner: top_performer(
            employees,
            overtime_records
                .iter()
                .map(|r| (r.employee_id.as_str(), r.total_amount)),
        ),
        top_deduction_person: top_performer(
            employees,
            payslips.iter().map(|p| (p.employee_id.as_str(), p.withheld())),
        ),
    }
}

/// Groups amounts by employee id and picks the largest total.
///
/// Equal totals resolve to the lexicographically smallest employee id. A winner that
/// is no longer among `employees` is reported as nobody.
fn top_performer<'a>(
    employees: &[Employee],
    amounts: impl Iterator<Item = (&'a str, f64)>,
) -> TopPerformer {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (employee_id, amount) in amounts {
        *totals.entry(employee_id).or_default() += amount;
    }

    // BTreeMap iterates ids in ascending order; only a strictly larger total displaces
    let winner = totals.into_iter().fold(None, |best: Option<(&str, f64)>, (id, total)| {
        match best {
            Some((_, best_total)) if total <= best_total => best,
            _ => Some((id, total)),
        }
    });

    winner
        .and_then(|(id, total)| {
            employees.iter().find(|e| e.id == id).map(|e| TopPerformer {
                employee_id: Some(e.id.clone()),
                name: e.name.clone(),
                amount: total,
            })
        })
        .unwrap_or_else(TopPerformer::none)
}

/// Sums net salary for each of the six months ending with `today`'s month.
///
/// Buckets are ordered oldest first; months without payslips report zero.
#[must_use]
pub fn monthly_payout_series(payslips: &[Payslip], today: NaiveDate) -> Vec<MonthlyPayout> {
    let mut periods = Vec::with_capacity(SERIES_MONTHS);
    let mut period = PayPeriod::containing(today);
    for _ in 0..SERIES_MONTHS {
        periods.push(period);
        period = period.previous();
    }
    periods.reverse();

    periods
        .into_iter()
        .map(|period| MonthlyPayout {
            period,
            label: period.short_label(),
            total: payslips
                .iter()
                .filter(|p| p.year == period.year() && p.month == period.month())
                .map(|p| p.net_salary)
                .sum(),
        })
        .collect()
}

/// Sums net salary per department in first-seen order.
///
/// Payslips of employees that no longer exist are skipped.
#[must_use]
pub fn department_distribution(payslips: &[Payslip], employees: &[Employee]) -> Vec<(String, f64)> {
    let by_id: HashMap<&str, &Employee> = employees.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut distribution: Vec<(String, f64)> = Vec::new();
    for payslip in payslips {
        let Some(employee) = by_id.get(payslip.employee_id.as_str()) else {
            continue;
        };
        let department = if employee.department.trim().is_empty() {
            UNCATEGORIZED
        } else {
            employee.department.as_str()
        };

        match distribution.iter_mut().find(|(name, _)| name == department) {
            Some((_, total)) => *total += payslip.net_salary,
            None => distribution.push((department.to_string(), payslip.net_salary)),
        }
    }
    distribution
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_top_salary_earner_is_highest_net() {
        let employees = vec![
            test_employee("emp-a", "Alice", 1000.0),
            test_employee("emp-b", "Bob", 2000.0),
        ];
        let payslips = vec![
            test_payslip("emp-a", 2024, 3, 1000.0),
            test_payslip("emp-b", 2024, 3, 2000.0),
        ];

        let stats = dashboard_stats(&employees, &payslips, &[]);

        assert_eq!(stats.top_salary_earner.name, "Bob");
        assert_eq!(stats.top_salary_earner.amount, 2000.0);
        assert_eq!(stats.total_salary_paid, 3000.0);
        assert_eq!(stats.payslips_generated, 2);
        assert_eq!(stats.total_employees, 2);
    }

    #[test]
    fn test_top_performer_sums_across_months() {
        let employees = vec![
            test_employee("emp-a", "Alice", 1000.0),
            test_employee("emp-b", "Bob", 2000.0),
        ];
        let payslips = vec![
            test_payslip("emp-a", 2024, 2, 1500.0),
            test_payslip("emp-a", 2024, 3, 1500.0),
            test_payslip("emp-b", 2024, 3, 2000.0),
        ];

        let stats = dashboard_stats(&employees, &payslips, &[]);
        assert_eq!(stats.top_salary_earner.employee_id.as_deref(), Some("emp-a"));
        assert_eq!(stats.top_salary_earner.amount, 3000.0);
    }

    #[test]
    fn test_tie_resolves_to_smallest_id() {
        let employees = vec![
            test_employee("emp-b", "Bob", 1000.0),
            test_employee("emp-a", "Alice", 1000.0),
        ];
        let payslips = vec![
            test_payslip("emp-b", 2024, 3, 1000.0),
            test_payslip("emp-a", 2024, 3, 1000.0),
        ];

        let stats = dashboard_stats(&employees, &payslips, &[]);
        assert_eq!(stats.top_salary_earner.name, "Alice");
    }

    #[test]
    fn test_missing_winner_reports_not_available() {
        let employees = vec![test_employee("emp-a", "Alice", 1000.0)];
        let payslips = vec![
            test_payslip("emp-a", 2024, 3, 1000.0),
            test_payslip("emp-gone", 2024, 3, 5000.0),
        ];

        let stats = dashboard_stats(&employees, &payslips, &[]);
        assert_eq!(stats.top_salary_earner.name, NO_PERFORMER);
        assert_eq!(stats.top_salary_earner.amount, 0.0);
        assert_eq!(stats.top_salary_earner.employee_id, None);
    }

    #[test]
    fn test_empty_collections() {
        let stats = dashboard_stats(&[], &[], &[]);
        assert_eq!(stats.total_salary_paid, 0.0);
        assert_eq!(stats.top_overtime_earner.name, NO_PERFORMER);
        assert_eq!(stats.top_deduction_person.name, NO_PERFORMER);
    }

    #[test]
    fn test_overtime_and_deduction_totals() {
        let state = setup_with_employees();
        let records = vec![
            test_overtime_record("ot-1", "emp-001", "2024-03-01", 2.0, 100.0),
            test_overtime_record("ot-2", "emp-002", "2024-03-01", 1.0, 100.0),
            test_overtime_record("ot-3", "emp-002", "2024-03-02", 2.5, 100.0),
        ];
        let mut slip = test_payslip("emp-003", 2024, 3, 10000.0);
        slip.total_deductions = 3000.0;
        slip.absent_deduction = 200.0;
        slip.recompute();

        let stats = dashboard_stats(&state.employees, &[slip], &records);

        assert_eq!(stats.total_overtime, 550.0);
        assert_eq!(stats.top_overtime_earner.name, "Karim Mia");
        assert_eq!(stats.top_overtime_earner.amount, 350.0);
        assert_eq!(stats.total_deductions, 3200.0);
        assert_eq!(stats.top_deduction_person.name, "Fatema Begum");
        assert_eq!(stats.top_deduction_person.amount, 3200.0);
    }

    #[test]
    fn test_series_covers_six_months_oldest_first() {
        let payslips = vec![
            test_payslip("emp-a", 2024, 3, 1000.0),
            test_payslip("emp-b", 2024, 3, 500.0),
            test_payslip("emp-a", 2023, 10, 700.0),
            // outside the window
            test_payslip("emp-a", 2023, 9, 9999.0),
        ];

        let series = monthly_payout_series(&payslips, date("2024-03-15"));

        assert_eq!(series.len(), SERIES_MONTHS);
        assert_eq!(series[0].period, PayPeriod::new(2023, 10).unwrap());
        assert_eq!(series[0].total, 700.0);
        assert_eq!(series[5].period, PayPeriod::new(2024, 3).unwrap());
        assert_eq!(series[5].total, 1500.0);
        assert_eq!(series[5].label, "Mar 24");
        assert_eq!(series.iter().map(|m| m.total).sum::<f64>(), 2200.0);
    }

    #[test]
    fn test_department_distribution() {
        let mut employees = vec![
            test_employee("emp-a", "Alice", 1000.0),
            test_employee("emp-b", "Bob", 1000.0),
            test_employee("emp-c", "Carol", 1000.0),
        ];
        employees[1].department = "Quality".to_string();
        employees[2].department = "  ".to_string();
        let payslips = vec![
            test_payslip("emp-a", 2024, 3, 1000.0),
            test_payslip("emp-b", 2024, 3, 2000.0),
            test_payslip("emp-a", 2024, 4, 1000.0),
            test_payslip("emp-c", 2024, 4, 300.0),
            test_payslip("emp-gone", 2024, 4, 5000.0),
        ];

        let distribution = department_distribution(&payslips, &employees);

        assert_eq!(
            distribution,
            vec![
                ("Production".to_string(), 2000.0),
                ("Quality".to_string(), 2000.0),
                (UNCATEGORIZED.to_string(), 300.0),
            ]
        );
    }
}
