//! Application state - the collections the payroll owns.
//!
//! Every mutation first computes the replacement collection with the pure functions of
//! the sibling modules and only then assigns it, so a failed operation leaves the state
//! untouched.

use super::{
    absence::{self, AbsenceSummary, DailyAbsence, DailyAbsenceEdit, Remarks},
    bundle::{self, DataBundle},
    cv,
    employee::{self, BulkAddOutcome, EmployeeDraft},
    notes::{self, NoteDraft},
    overtime::{self, OvertimeEntry, OvertimeUpdate},
    payslip,
};
use crate::{
    errors::{Error, Result},
    models::{Employee, EmployeeCv, Note, OvertimeRecord, Payslip, Settings},
};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::info;

/// Every collection of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// All employees, newest first
    pub employees: Vec<Employee>,
    /// Finalized payslips
    pub payslips: Vec<Payslip>,
    /// All overtime records
    pub overtime_records: Vec<OvertimeRecord>,
    /// Employee CVs
    pub employee_cvs: Vec<EmployeeCv>,
    /// Payroll settings
    pub settings: Settings,
    /// Notes board, newest first
    pub notes: Vec<Note>,
    /// Absence remarks by `{person}-{date}`
    pub absence_remarks: Remarks,
    /// Employee categories, carried opaquely
    pub categories: Value,
    /// Category membership, carried opaquely
    pub categorized_employees: Value,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            employees: Vec::new(),
            payslips: Vec::new(),
            overtime_records: Vec::new(),
            employee_cvs: Vec::new(),
            settings: Settings::default(),
            notes: Vec::new(),
            absence_remarks: Remarks::new(),
            categories: Value::Array(Vec::new()),
            categorized_employees: Value::Object(serde_json::Map::new()),
        }
    }
}

impl AppState {
    fn employee(&self, employee_id: &str) -> Result<&Employee> {
        self.employees
            .iter()
            .find(|e| e.id == employee_id)
            .ok_or_else(|| Error::EmployeeNotFound {
                id: employee_id.to_string(),
            })
    }

    /// Creates an employee from form input and puts them first in the list.
    pub fn add_employee(&mut self, draft: EmployeeDraft) -> Result<&Employee> {
        let created = employee::create_employee(draft)?;
        info!(id = %created.id, name = %created.name, "Added employee");
        self.employees = employee::add_employee(&self.employees, created);
        self.employees
            .first()
            .ok_or_else(|| Error::validation("Employee list is empty after insert"))
    }

    /// Adds imported employees, skipping display codes already present.
    pub fn bulk_add_employees(&mut self, incoming: Vec<Employee>) -> (usize, usize) {
        let BulkAddOutcome {
            employees,
            added,
            duplicates,
        } = employee::bulk_add(&self.employees, incoming);
        self.employees = employees;
        (added, duplicates)
    }

    /// Replaces an employee's record.
    pub fn update_employee(&mut self, updated: Employee) -> Result<()> {
        self.employees = employee::update_employee(&self.employees, updated)?;
        Ok(())
    }

    /// Deletes an employee with their payslips, overtime records and CV.
    pub fn delete_employee(&mut self, employee_id: &str) -> Result<()> {
        self.employee(employee_id)?;

        self.employees.retain(|e| e.id != employee_id);
        self.payslips.retain(|p| p.employee_id != employee_id);
        self.overtime_records.retain(|r| r.employee_id != employee_id);
        self.employee_cvs.retain(|c| c.employee_id != employee_id);

        info!(id = %employee_id, "Deleted employee and dependent records");
        Ok(())
    }

    /// Records one overtime sheet: the entries of a single date, optionally covering for
    /// an absent employee. Returns the new records.
    pub fn save_overtime(
        &mut self,
        entries: &[OvertimeEntry],
        date: NaiveDate,
        absentee_id: Option<&str>,
    ) -> Result<Vec<OvertimeRecord>> {
        let absentee = absentee_id.map(|id| self.employee(id)).transpose()?;
        let created =
            overtime::create_records(&self.employees, entries, date, absentee, &self.settings)?;

        self.overtime_records = self
            .overtime_records
            .iter()
            .cloned()
            .chain(created.iter().cloned())
            .collect();
        info!(count = created.len(), %date, "Saved overtime records");
        Ok(created)
    }

    /// Edits one overtime record's date, hours and absentee.
    pub fn update_overtime(
        &mut self,
        record_id: &str,
        date: NaiveDate,
        hours: f64,
        absentee_id: Option<&str>,
    ) -> Result<()> {
        let absentee = absentee_id.map(|id| self.employee(id)).transpose()?;
        let update = OvertimeUpdate {
            date,
            hours,
            absentee,
        };
        self.overtime_records = overtime::update_record(&self.overtime_records, record_id, &update)?;
        Ok(())
    }

    /// Deletes overtime records by id.
    pub fn delete_overtime(&mut self, record_ids: &[String]) {
        self.overtime_records = overtime::delete_records(&self.overtime_records, record_ids);
    }

    /// Current absence summaries.
    #[must_use]
    pub fn absences(&self) -> Vec<AbsenceSummary> {
        absence::aggregate_absences(&self.overtime_records, &self.employees, &self.absence_remarks)
    }

    /// Deletes every record and remark of one absent person.
    pub fn delete_absence_group(&mut self, summary: &AbsenceSummary) {
        let (records, remarks) =
            absence::delete_absence_group(&self.overtime_records, &self.absence_remarks, summary);
        self.overtime_records = records;
        self.absence_remarks = remarks;
    }

    /// Deletes one day of absence.
    pub fn delete_daily_absence(&mut self, day: &DailyAbsence) {
        let (records, remarks) =
            absence::delete_daily_absence(&self.overtime_records, &self.absence_remarks, day);
        self.overtime_records = records;
        self.absence_remarks = remarks;
    }

    /// Edits one day of absence.
    pub fn edit_daily_absence(&mut self, day: &DailyAbsence, edit: &DailyAbsenceEdit) -> Result<()> {
        let (records, remarks) = absence::edit_daily_absence(
            &self.overtime_records,
            &self.absence_remarks,
            &self.employees,
            day,
            edit,
        )?;
        self.overtime_records = records;
        self.absence_remarks = remarks;
        Ok(())
    }

    /// Finalizes a salary batch into the stored payslips.
    pub fn process_salaries(&mut self, batch: &[Payslip]) {
        self.payslips = payslip::finalize_batch(&self.payslips, batch);
    }

    /// Replaces the settings wholesale. Every numeric setting must be a finite,
    /// non-negative number.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        let numbers = [
            ("Overtime rate", settings.overtime_rate),
            ("Overtime multiplier", settings.overtime_multiplier),
            (
                "Overtime calculation basic salary",
                settings.overtime_calculation_basic_salary,
            ),
            ("Working days per month", settings.working_days_per_month),
            ("Working hours per day", settings.working_hours_per_day),
        ];
        if let Some((label, value)) = numbers
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(Error::validation(format!(
                "{label} must be a non-negative number, got {value}"
            )));
        }

        self.settings = settings;
        info!("Updated settings");
        Ok(())
    }

    /// Saves an employee's CV, inserting or replacing it.
    pub fn save_cv(&mut self, employee_cv: EmployeeCv) -> Result<()> {
        self.employee(&employee_cv.employee_id)?;
        self.employee_cvs = cv::save_cv(&self.employee_cvs, employee_cv);
        Ok(())
    }

    /// Adds a note to the top of the board.
    pub fn add_note(&mut self, draft: NoteDraft) {
        self.notes = notes::add_note(&self.notes, draft, Utc::now());
    }

    /// Replaces a note, refreshing its update time.
    pub fn update_note(&mut self, note: Note) -> Result<()> {
        self.notes = notes::update_note(&self.notes, note, Utc::now())?;
        Ok(())
    }

    /// Deletes a note.
    pub fn delete_note(&mut self, note_id: &str) -> Result<()> {
        self.notes = notes::delete_note(&self.notes, note_id)?;
        Ok(())
    }

    /// Snapshot of every exported collection.
    #[must_use]
    pub fn export_bundle(&self) -> DataBundle {
        DataBundle {
            month_base: bundle::MONTH_BASE,
            settings: self.settings.clone(),
            employees: self.employees.clone(),
            payslips: self.payslips.clone(),
            overtime_records: self.overtime_records.clone(),
            employee_cvs: self.employee_cvs.clone(),
            categories: Some(self.categories.clone()),
            categorized_employees: Some(self.categorized_employees.clone()),
        }
    }

    /// Replaces every bundled collection. Notes and absence remarks are kept, as are
    /// categories the bundle does not carry.
    pub fn apply_bundle(&mut self, bundle: DataBundle) {
        self.settings = bundle.settings;
        self.employees = bundle.employees;
        self.payslips = bundle.payslips;
        self.overtime_records = bundle.overtime_records;
        self.employee_cvs = bundle.employee_cvs;
        if let Some(categories) = bundle.categories {
            self.categories = categories;
        }
        if let Some(categorized) = bundle.categorized_employees {
            self.categorized_employees = categorized;
        }
        info!(employees = self.employees.len(), "Imported data bundle");
    }
}
