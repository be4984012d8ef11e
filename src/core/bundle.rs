//! Whole-application data export and import.
//!
//! A bundle is one JSON document holding every collection needed to restore the
//! application elsewhere. Import is all-or-nothing: a document missing any required
//! section, or with a section that does not parse, is rejected before anything is replaced.
//!
//! Bundles written by older versions of the application count payslip months from `0`.
//! Such bundles carry no `monthBase` marker and their months are shifted on import.

use super::cv;
use crate::{
    errors::{Error, Result},
    models::{Employee, EmployeeCv, OvertimeRecord, Payslip, Settings},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Sections a bundle must carry to be importable.
pub const REQUIRED_SECTIONS: [&str; 4] = ["employees", "payslips", "overtimeRecords", "settings"];

/// Month numbering of the bundles written here (January is `1`).
pub const MONTH_BASE: u64 = 1;

/// Every exported collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBundle {
    /// Number of the first month in `payslips`, always [`MONTH_BASE`] once parsed
    pub month_base: u64,
    /// Payroll settings
    pub settings: Settings,
    /// All employees
    pub employees: Vec<Employee>,
    /// Finalized payslips
    pub payslips: Vec<Payslip>,
    /// All overtime records
    pub overtime_records: Vec<OvertimeRecord>,
    /// Employee CVs
    #[serde(rename = "employeeCVs")]
    pub employee_cvs: Vec<EmployeeCv>,
    /// Employee categories, carried opaquely
    #[serde(rename = "factory_categories", skip_serializing_if = "Option::is_none")]
    pub categories: Option<Value>,
    /// Category membership, carried opaquely
    #[serde(
        rename = "factory_categorized_employees",
        skip_serializing_if = "Option::is_none"
    )]
    pub categorized_employees: Option<Value>,
}

impl DataBundle {
    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Suggested file name for an export made on `date` (`YYYY-MM-DD`).
    #[must_use]
    pub fn file_name(date: &str) -> String {
        format!("factory_salary_data_{date}.json")
    }
}

fn section<T: serde::de::DeserializeOwned>(document: &mut Value, key: &str) -> Result<T> {
    serde_json::from_value(document[key].take()).map_err(|err| {
        Error::validation(format!("Invalid data file. Section `{key}` is malformed: {err}"))
    })
}

fn opaque(document: &mut Value, key: &str) -> Option<Value> {
    match document[key].take() {
        Value::Null => None,
        value => Some(value),
    }
}

/// Parses and validates an exported bundle.
///
/// Settings merge field-wise with the defaults and legacy CVs are upgraded.
pub fn parse_bundle(text: &str) -> Result<DataBundle> {
    let mut document: Value = serde_json::from_str(text)?;
    if !document.is_object() {
        return Err(Error::validation("Invalid data file. Expected a JSON object."));
    }

    if REQUIRED_SECTIONS
        .iter()
        .any(|key| document.get(key).is_none_or(Value::is_null))
    {
        return Err(Error::validation(
            "Invalid data file. Missing required data sections (employees, payslips, overtimeRecords, settings).",
        ));
    }

    let zero_based_months = document
        .get("monthBase")
        .and_then(Value::as_u64)
        .unwrap_or(0)
        == 0;
    let mut payslips: Vec<Payslip> = section(&mut document, "payslips")?;
    if zero_based_months {
        payslips.iter_mut().for_each(|p| p.month += 1);
        warn!(count = payslips.len(), "Shifted zero-based payslip months");
    }
    if let Some(bad) = payslips.iter().find(|p| !(1..=12).contains(&p.month)) {
        return Err(Error::validation(format!(
            "Invalid data file. Payslip `{}` has month {}.",
            bad.id, bad.month
        )));
    }

    let employee_cvs = match document["employeeCVs"].take() {
        Value::Array(cvs) => cvs.into_iter().map(cv::upgrade).collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };

    let bundle = DataBundle {
        month_base: MONTH_BASE,
        settings: section(&mut document, "settings")?,
        employees: section(&mut document, "employees")?,
        payslips,
        overtime_records: section(&mut document, "overtimeRecords")?,
        employee_cvs,
        categories: opaque(&mut document, "factory_categories"),
        categorized_employees: opaque(&mut document, "factory_categorized_employees"),
    };

    info!(
        employees = bundle.employees.len(),
        payslips = bundle.payslips.len(),
        overtime_records = bundle.overtime_records.len(),
        cvs = bundle.employee_cvs.len(),
        "Parsed data bundle"
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use serde_json::json;

    #[test]
    fn test_export_then_parse_restores_collections() {
        let state = setup_with_employees();
        let bundle = DataBundle {
            month_base: MONTH_BASE,
            settings: Settings::default(),
            employees: state.employees.clone(),
            payslips: vec![test_payslip("emp-001", 2024, 3, 1000.0)],
            overtime_records: vec![test_overtime_record("ot-1", "emp-001", "2024-03-01", 2.0, 80.0)],
            employee_cvs: vec![cv::default_cv("emp-001")],
            categories: Some(json!(["Sewing"])),
            categorized_employees: None,
        };

        let text = bundle.to_json().unwrap();
        assert!(text.contains("\"overtimeRecords\""));
        assert!(text.contains("\"employeeCVs\""));
        assert!(text.contains("\"monthBase\": 1"));
        assert!(!text.contains("factory_categorized_employees"));

        assert_eq!(parse_bundle(&text).unwrap(), bundle);
    }

    #[test]
    fn test_missing_section_rejected() {
        let text = json!({
            "employees": [],
            "payslips": [],
            "settings": {}
        })
        .to_string();

        let err = parse_bundle(&text).unwrap_err();
        assert!(err.to_string().contains("Missing required data sections"));
    }

    #[test]
    fn test_malformed_section_rejected() {
        let text = json!({
            "employees": "not a list",
            "payslips": [],
            "overtimeRecords": [],
            "settings": {}
        })
        .to_string();

        assert!(matches!(parse_bundle(&text), Err(Error::Validation { .. })));
        assert!(matches!(parse_bundle("[1, 2]"), Err(Error::Validation { .. })));
        assert!(matches!(parse_bundle("{oops"), Err(Error::Json(_))));
    }

    #[test]
    fn test_partial_settings_and_legacy_cvs() {
        let text = json!({
            "employees": [],
            "payslips": [],
            "overtimeRecords": [],
            "settings": {"overtimeRate": 100},
            "employeeCVs": [{"employeeId": "emp-001", "contactNo": "01700-000000"}]
        })
        .to_string();

        let bundle = parse_bundle(&text).unwrap();

        assert_eq!(bundle.settings.overtime_rate, 100.0);
        assert_eq!(bundle.settings.working_days_per_month, 30.0);
        assert_eq!(bundle.employee_cvs[0].sections[0].id, "contact");
        assert_eq!(bundle.categories, None);
    }

    #[test]
    fn test_legacy_cv_with_null_fields_imports() {
        let text = json!({
            "monthBase": 1,
            "employees": [],
            "payslips": [],
            "overtimeRecords": [],
            "settings": {},
            "employeeCVs": [{"employeeId": "emp-1", "contactNo": "0170", "email": null}]
        })
        .to_string();

        let bundle = parse_bundle(&text).unwrap();

        assert_eq!(bundle.employee_cvs.len(), 1);
        assert_eq!(bundle.employee_cvs[0].sections[0].items.len(), 1);
    }

    #[test]
    fn test_zero_based_months_shifted() {
        let mut january = serde_json::to_value(test_payslip("emp-001", 2024, 1, 900.0)).unwrap();
        january["month"] = json!(0);
        let mut march = serde_json::to_value(test_payslip("emp-001", 2024, 3, 1000.0)).unwrap();
        march["month"] = json!(2);
        let text = json!({
            "employees": [],
            "payslips": [january, march],
            "overtimeRecords": [],
            "settings": {}
        })
        .to_string();

        let bundle = parse_bundle(&text).unwrap();

        assert_eq!(bundle.month_base, MONTH_BASE);
        assert_eq!(bundle.payslips[0].month, 1);
        assert_eq!(bundle.payslips[1].month, 3);
        assert_eq!(bundle.payslips[1].period().unwrap().month_name(), "March");
    }

    #[test]
    fn test_out_of_range_month_rejected() {
        let mut slip = serde_json::to_value(test_payslip("emp-001", 2024, 1, 900.0)).unwrap();
        slip["month"] = json!(0);
        let text = json!({
            "monthBase": 1,
            "employees": [],
            "payslips": [slip],
            "overtimeRecords": [],
            "settings": {}
        })
        .to_string();

        let err = parse_bundle(&text).unwrap_err();
        assert!(err.to_string().contains("has month 0"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            DataBundle::file_name("2024-03-31"),
            "factory_salary_data_2024-03-31.json"
        );
    }
}
