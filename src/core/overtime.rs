//! Overtime business logic - rate resolution, record creation and aggregation.
//!
//! The effective hourly rate comes either from a fixed override in the settings or is
//! derived from a reference basic salary. Records carry their own rate so that later
//! settings changes never rewrite history. Aggregations are pure reductions over the
//! flat record collection.

use crate::{
    errors::{Error, Result},
    models::{
        Employee, OvertimeRecord, PayPeriod, Settings,
        overtime::{DATE_FORMAT, clamp_hours},
        round_to_cents,
    },
};
use chrono::NaiveDate;
use std::{cmp::Ordering, collections::HashMap, hash::Hash};
use tracing::debug;

/// Summed hours and pay over a set of overtime records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OvertimeTotals {
    /// Total hours worked
    pub total_hours: f64,
    /// Total overtime pay
    pub total_pay: f64,
}

impl OvertimeTotals {
    fn add(&mut self, record: &OvertimeRecord) {
        self.total_hours += record.hours;
        self.total_pay += record.total_amount;
    }
}

/// Hours one employee worked, as entered on the overtime sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct OvertimeEntry {
    /// Internal id of the employee
    pub employee_id: String,
    /// Hours worked; negative values clamp to zero and zero-hour entries are skipped
    pub hours: f64,
}

/// Edited fields of an existing overtime record.
#[derive(Debug, Clone)]
pub struct OvertimeUpdate<'a> {
    /// Day the hours were worked
    pub date: NaiveDate,
    /// Hours worked
    pub hours: f64,
    /// Tracked employee covered for; `None` clears the absentee
    pub absentee: Option<&'a Employee>,
}

/// Computes the effective hourly overtime rate.
///
/// A positive fixed `overtime_rate` wins outright. Otherwise the rate is
/// `basic / working_days / working_hours * multiplier`, or `0` when either divisor is zero.
#[must_use]
pub fn resolve_rate(settings: &Settings) -> f64 {
    if settings.overtime_rate > 0.0 {
        return settings.overtime_rate;
    }

    if settings.working_days_per_month == 0.0 || settings.working_hours_per_day == 0.0 {
        return 0.0;
    }

    let daily_salary = settings.overtime_calculation_basic_salary / settings.working_days_per_month;
    let hourly_rate = daily_salary / settings.working_hours_per_day;
    hourly_rate * settings.overtime_multiplier
}

/// Builds one overtime record per entry with positive hours.
///
/// Every record is stamped with the rounded effective rate and, when given, the absent
/// employee it covers for. The whole batch is rejected when no entry has hours or an
/// entry names an unknown employee.
pub fn create_records(
    employees: &[Employee],
    entries: &[OvertimeEntry],
    date: NaiveDate,
    absentee: Option<&Employee>,
    settings: &Settings,
) -> Result<Vec<OvertimeRecord>> {
    let rate = round_to_cents(resolve_rate(settings));
    let date = date.format(DATE_FORMAT).to_string();

    let records = entries
        .iter()
        .filter(|entry| clamp_hours(entry.hours) > 0.0)
        .map(|entry| {
            let employee = employees
                .iter()
                .find(|e| e.id == entry.employee_id)
                .ok_or_else(|| Error::EmployeeNotFound {
                    id: entry.employee_id.clone(),
                })?;

            let mut record = OvertimeRecord {
                id: format!("ot-{}-{}", employee.id, uuid::Uuid::new_v4().simple()),
                employee_id: employee.id.clone(),
                employee_display_id: employee.employee_id.clone(),
                employee_name: employee.name.clone(),
                department: employee.department.clone(),
                designation: employee.designation.clone(),
                date: date.clone(),
                hours: 0.0,
                rate,
                total_amount: 0.0,
                absent_employee_id: absentee.map(|a| a.id.clone()),
                absent_employee_name: absentee.map(|a| a.name.clone()),
            };
            record.set_hours(entry.hours);
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;

    if records.is_empty() {
        return Err(Error::validation(
            "Please add employees and enter their overtime hours before saving.",
        ));
    }

    debug!(count = records.len(), rate, "Created overtime records");
    Ok(records)
}

/// Sums hours and pay over any set of records.
pub fn totals<'a>(records: impl IntoIterator<Item = &'a OvertimeRecord>) -> OvertimeTotals {
    records
        .into_iter()
        .fold(OvertimeTotals::default(), |mut acc, record| {
            acc.add(record);
            acc
        })
}

/// Sums one employee's overtime between `start` and `end`, both inclusive.
///
/// Records with a missing or malformed date never match.
#[must_use]
pub fn aggregate_by_employee(
    records: &[OvertimeRecord],
    employee_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> OvertimeTotals {
    totals(records.iter().filter(|record| {
        record.employee_id == employee_id
            && record
                .parsed_date()
                .is_some_and(|date| date >= start && date <= end)
    }))
}

/// Sums one employee's overtime within a calendar month.
#[must_use]
pub fn aggregate_for_period(
    records: &[OvertimeRecord],
    employee_id: &str,
    period: PayPeriod,
) -> OvertimeTotals {
    aggregate_by_employee(records, employee_id, period.first_day(), period.last_day())
}

/// Total overtime paid across every record.
#[must_use]
pub fn aggregate_all(records: &[OvertimeRecord]) -> f64 {
    records.iter().map(|record| record.total_amount).sum()
}

/// Groups records by an arbitrary key and sums each group.
///
/// Records for which `key` returns `None` are skipped. Groups come back in the order
/// their key was first seen.
pub fn group_totals<K, F>(records: &[OvertimeRecord], key: F) -> Vec<(K, OvertimeTotals)>
where
    K: Eq + Hash + Clone,
    F: Fn(&OvertimeRecord) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, OvertimeTotals)> = Vec::new();

    for record in records {
        let Some(k) = key(record) else { continue };
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, OvertimeTotals::default()));
            groups.len() - 1
        });
        groups[slot].1.add(record);
    }

    groups
}

/// Orders records newest first; records without a valid date sort last.
pub(crate) fn newest_first(a: &OvertimeRecord, b: &OvertimeRecord) -> Ordering {
    match (a.parsed_date(), b.parsed_date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// All records of one employee, newest first.
#[must_use]
pub fn records_for_employee<'a>(
    records: &'a [OvertimeRecord],
    employee_id: &str,
) -> Vec<&'a OvertimeRecord> {
    let mut found: Vec<_> = records
        .iter()
        .filter(|record| record.employee_id == employee_id)
        .collect();
    found.sort_by(|a, b| newest_first(a, b));
    found
}

/// Records whose employee name (case-insensitive) or date contains `term`, newest first.
#[must_use]
pub fn search_records<'a>(records: &'a [OvertimeRecord], term: &str) -> Vec<&'a OvertimeRecord> {
    let needle = term.trim().to_lowercase();
    let mut found: Vec<_> = records
        .iter()
        .filter(|record| {
            needle.is_empty()
                || record.employee_name.to_lowercase().contains(&needle)
                || record.date.contains(&needle)
        })
        .collect();
    found.sort_by(|a, b| newest_first(a, b));
    found
}

/// Returns the collection with one record edited; the total is recomputed from the new hours.
pub fn update_record(
    records: &[OvertimeRecord],
    record_id: &str,
    update: &OvertimeUpdate<'_>,
) -> Result<Vec<OvertimeRecord>> {
    if !records.iter().any(|record| record.id == record_id) {
        return Err(Error::OvertimeRecordNotFound {
            id: record_id.to_string(),
        });
    }

    Ok(records
        .iter()
        .map(|record| {
            if record.id != record_id {
                return record.clone();
            }
            let mut edited = record.clone();
            edited.date = update.date.format(DATE_FORMAT).to_string();
            edited.absent_employee_id = update.absentee.map(|a| a.id.clone());
            edited.absent_employee_name = update.absentee.map(|a| a.name.clone());
            edited.set_hours(update.hours);
            edited
        })
        .collect())
}

/// Returns the collection without the given records.
#[must_use]
pub fn delete_records(records: &[OvertimeRecord], record_ids: &[String]) -> Vec<OvertimeRecord> {
    records
        .iter()
        .filter(|record| !record_ids.contains(&record.id))
        .cloned()
        .collect()
}
