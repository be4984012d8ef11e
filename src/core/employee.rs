//! Employee registry business logic.
//!
//! Provides creation from validated form input, single and bulk addition (the latter
//! ignoring display codes that already exist), in-place update and CSV import.
//! Deleting an employee cascades across several collections and lives on
//! [`AppState`](crate::core::state::AppState).

use crate::{
    errors::{Error, Result},
    models::{Employee, PayItem},
};
use std::{collections::HashSet, io::Read};
use tracing::{info, warn};

/// Columns an employee CSV must carry.
pub const CSV_HEADERS: [&str; 6] = [
    "employeeId",
    "name",
    "department",
    "designation",
    "joiningDate",
    "basicSalary",
];

/// Form input for a new employee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeDraft {
    /// Display code, e.g. `F-101`
    pub employee_id: String,
    /// Full name, required
    pub name: String,
    /// Department
    pub department: String,
    /// Job title
    pub designation: String,
    /// Joining date as entered
    pub joining_date: String,
    /// Monthly basic salary
    pub basic_salary: f64,
    /// Monthly allowances
    pub allowances: Vec<PayItem>,
    /// Monthly deductions
    pub deductions: Vec<PayItem>,
    /// Photo as a data URL
    pub photo: Option<String>,
}

/// Result of a bulk addition.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkAddOutcome {
    /// The new employee list, added employees first
    pub employees: Vec<Employee>,
    /// Employees that were added
    pub added: usize,
    /// Incoming employees ignored because their display code already exists
    pub duplicates: usize,
}

fn new_employee_id() -> String {
    format!("emp-{}", uuid::Uuid::new_v4().simple())
}

/// Whether `amount` is a finite, non-negative sum of money.
fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

/// Rejects a basic salary or pay item that could not be stored as a number.
fn check_amounts(basic_salary: f64, allowances: &[PayItem], deductions: &[PayItem]) -> Result<()> {
    if !is_valid_amount(basic_salary) {
        return Err(Error::validation(format!(
            "Basic salary must be a non-negative amount, got {basic_salary}"
        )));
    }
    if let Some(item) = allowances
        .iter()
        .chain(deductions)
        .find(|item| !is_valid_amount(item.amount))
    {
        return Err(Error::validation(format!(
            "{} must be a non-negative amount, got {}",
            item.kind, item.amount
        )));
    }
    Ok(())
}

/// Creates an employee with a fresh internal id from validated form input.
pub fn create_employee(draft: EmployeeDraft) -> Result<Employee> {
    let employee_id = draft.employee_id.trim().to_string();
    let name = draft.name.trim().to_string();

    if employee_id.is_empty() || name.is_empty() {
        return Err(Error::validation("Employee ID and name are required."));
    }
    check_amounts(draft.basic_salary, &draft.allowances, &draft.deductions)?;

    Ok(Employee {
        id: new_employee_id(),
        employee_id,
        name,
        department: draft.department,
        designation: draft.designation,
        joining_date: draft.joining_date,
        basic_salary: draft.basic_salary,
        allowances: draft.allowances,
        deductions: draft.deductions,
        photo: draft.photo,
    })
}

/// Returns the list with `employee` added at the front.
#[must_use]
pub fn add_employee(employees: &[Employee], employee: Employee) -> Vec<Employee> {
    std::iter::once(employee)
        .chain(employees.iter().cloned())
        .collect()
}

/// Adds every incoming employee whose display code is not yet taken.
///
/// Only codes already on the list count as duplicates; the incoming batch is
/// not checked against itself.
#[must_use]
pub fn bulk_add(existing: &[Employee], incoming: Vec<Employee>) -> BulkAddOutcome {
    let taken: HashSet<&str> = existing.iter().map(|e| e.employee_id.as_str()).collect();
    let incoming_count = incoming.len();

    let unique: Vec<Employee> = incoming
        .into_iter()
        .filter(|e| !taken.contains(e.employee_id.as_str()))
        .collect();
    let added = unique.len();

    let employees = unique.into_iter().chain(existing.iter().cloned()).collect();

    info!(added, duplicates = incoming_count - added, "Bulk added employees");
    BulkAddOutcome {
        employees,
        added,
        duplicates: incoming_count - added,
    }
}

/// Replaces the employee sharing `updated`'s internal id.
pub fn update_employee(employees: &[Employee], updated: Employee) -> Result<Vec<Employee>> {
    if !employees.iter().any(|e| e.id == updated.id) {
        return Err(Error::EmployeeNotFound { id: updated.id });
    }
    check_amounts(updated.basic_salary, &updated.allowances, &updated.deductions)?;

    Ok(employees
        .iter()
        .map(|e| if e.id == updated.id { updated.clone() } else { e.clone() })
        .collect())
}

/// Parses employees from CSV with a header row.
///
/// Every required column must be present. A row without an employee id or a name aborts
/// the whole import; rows are counted from 1 with the header as row 1. A basic salary that
/// is unparsable, non-finite or negative becomes `0`. Imported employees start without
/// allowances or deductions.
pub fn parse_employee_csv(input: impl Read) -> Result<Vec<Employee>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    if CSV_HEADERS.iter().any(|h| column(h).is_none()) {
        return Err(Error::validation("CSV file is missing required headers."));
    }

    let mut employees = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let field = |name: &str| {
            column(name)
                .and_then(|i| row.get(i))
                .unwrap_or_default()
                .to_string()
        };

        let employee_id = field("employeeId");
        let name = field("name");
        if employee_id.is_empty() || name.is_empty() {
            return Err(Error::validation(format!(
                "Row {} is missing required employeeId or name.",
                index + 2
            )));
        }

        let raw_salary = field("basicSalary");
        let basic_salary = raw_salary
            .parse::<f64>()
            .ok()
            .filter(|salary| is_valid_amount(*salary))
            .unwrap_or_else(|| {
                warn!(row = index + 2, value = %raw_salary, "Invalid basic salary, using 0");
                0.0
            });

        employees.push(Employee {
            id: new_employee_id(),
            employee_id,
            name,
            department: field("department"),
            designation: field("designation"),
            joining_date: field("joiningDate"),
            basic_salary,
            allowances: Vec::new(),
            deductions: Vec::new(),
            photo: None,
        });
    }

    info!(count = employees.len(), "Parsed employees from CSV");
    Ok(employees)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn draft(code: &str, name: &str) -> EmployeeDraft {
        EmployeeDraft {
            employee_id: code.to_string(),
            name: name.to_string(),
            department: "Cutting".to_string(),
            basic_salary: 11000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_employee_assigns_fresh_id() {
        let a = create_employee(draft(" F-200 ", " Nasima ")).unwrap();
        let b = create_employee(draft("F-201", "Jamal")).unwrap();

        assert!(a.id.starts_with("emp-"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.employee_id, "F-200");
        assert_eq!(a.name, "Nasima");
        assert_eq!(a.basic_salary, 11000.0);
    }

    #[test]
    fn test_create_employee_validation() {
        assert!(matches!(
            create_employee(draft("", "Nasima")),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            create_employee(draft("F-1", "   ")),
            Err(Error::Validation { .. })
        ));

        let mut negative = draft("F-1", "Nasima");
        negative.basic_salary = -5.0;
        assert!(matches!(create_employee(negative), Err(Error::Validation { .. })));

        let mut not_a_number = draft("F-1", "Nasima");
        not_a_number.basic_salary = f64::NAN;
        assert!(matches!(create_employee(not_a_number), Err(Error::Validation { .. })));

        let mut infinite_allowance = draft("F-1", "Nasima");
        infinite_allowance.allowances = vec![PayItem::new("Medical", f64::INFINITY)];
        assert!(matches!(
            create_employee(infinite_allowance),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_add_employee_prepends() {
        let state = setup_with_employees();
        let new = test_employee("emp-009", "Nasima", 9000.0);

        let employees = add_employee(&state.employees, new);

        assert_eq!(employees.len(), 4);
        assert_eq!(employees[0].id, "emp-009");
        assert_eq!(employees[1].id, "emp-001");
    }

    #[test]
    fn test_bulk_add_ignores_existing_codes() {
        let state = setup_with_employees();
        let mut clash = test_employee("emp-100", "Someone Else", 1.0);
        clash.employee_id = "F-001".to_string();
        let incoming = vec![clash, test_employee("emp-004", "Nasima", 9000.0)];

        let outcome = bulk_add(&state.employees, incoming);

        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(outcome.employees.len(), 4);
        assert_eq!(outcome.employees[0].id, "emp-004");
    }

    #[test]
    fn test_update_employee() {
        let state = setup_with_employees();
        let mut karim = state.employees[1].clone();
        karim.basic_salary = 13000.0;

        let employees = update_employee(&state.employees, karim).unwrap();
        assert_eq!(employees[1].basic_salary, 13000.0);
        assert_eq!(employees[0], state.employees[0]);

        let ghost = test_employee("emp-404", "Ghost", 0.0);
        assert!(matches!(
            update_employee(&state.employees, ghost),
            Err(Error::EmployeeNotFound { .. })
        ));

        let mut broken = state.employees[0].clone();
        broken.basic_salary = f64::NAN;
        assert!(matches!(
            update_employee(&state.employees, broken),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_parse_employee_csv() {
        let csv = "employeeId,name,department,designation,joiningDate,basicSalary\n\
                   F-301,\"Nasima Akter\",Sewing,Operator,2023-05-01,10500\n\
                   F-302, Jamal Uddin ,Finishing,Helper,2023-06-01,not-a-number\n";

        let employees = parse_employee_csv(csv.as_bytes()).unwrap();

        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].name, "Nasima Akter");
        assert_eq!(employees[0].basic_salary, 10500.0);
        assert_eq!(employees[1].name, "Jamal Uddin");
        assert_eq!(employees[1].basic_salary, 0.0);
        assert_eq!(employees[1].joining_date, "2023-06-01");
        assert!(employees[1].allowances.is_empty());
    }

    #[test]
    fn test_parse_employee_csv_zeroes_non_finite_and_negative_salaries() {
        let csv = "employeeId,name,department,designation,joiningDate,basicSalary\n\
                   F-1,One,A,B,2023-01-01,NaN\n\
                   F-2,Two,A,B,2023-01-01,inf\n\
                   F-3,Three,A,B,2023-01-01,-250\n";

        let employees = parse_employee_csv(csv.as_bytes()).unwrap();

        assert_eq!(employees.len(), 3);
        assert!(employees.iter().all(|e| e.basic_salary == 0.0));
    }

    #[test]
    fn test_parse_employee_csv_missing_headers() {
        let csv = "employeeId,name\nF-1,Someone\n";
        let err = parse_employee_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: CSV file is missing required headers."
        );
    }

    #[test]
    fn test_parse_employee_csv_reports_row_number() {
        let csv = "employeeId,name,department,designation,joiningDate,basicSalary\n\
                   F-1,One,A,B,2023-01-01,100\n\
                   F-2,,A,B,2023-01-01,100\n";

        let err = parse_employee_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Row 3 is missing required employeeId or name."
        );
    }
}
