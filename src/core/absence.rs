//! Absence deduction business logic.
//!
//! Overtime worked in place of an absent colleague is withheld from that colleague's
//! salary. This module groups overtime records by the person they covered for, breaks
//! each person down by day, and keeps the free-text remarks attached to those days in
//! step when days are edited or deleted. Remarks are keyed `"{personName}-{date}"`.

use super::overtime::{OvertimeTotals, totals};
use crate::{
    errors::{Error, Result},
    models::{Employee, OvertimeRecord, PayPeriod, overtime::DATE_FORMAT},
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Free-text remarks per absent person and day
pub type Remarks = BTreeMap<String, String>;

/// Who an overtime record covered for.
///
/// A tracked employee is identified by id; someone outside the employee list only by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AbsenceKey {
    /// Absent person is a tracked employee
    ByEmployeeId(String),
    /// Absent person is known only by name
    ByName(String),
}

impl AbsenceKey {
    /// Resolves the key once per record: the absent id when present, else the absent name.
    #[must_use]
    pub fn for_record(record: &OvertimeRecord) -> Option<Self> {
        record
            .absent_id()
            .map(|id| Self::ByEmployeeId(id.to_string()))
            .or_else(|| record.absent_name().map(|name| Self::ByName(name.to_string())))
    }

    fn matches(&self, employee: &Employee) -> bool {
        match self {
            Self::ByEmployeeId(id) => &employee.id == id,
            Self::ByName(name) => &employee.name == name,
        }
    }
}

/// Storage key of the remark for a person on a day.
#[must_use]
pub fn remark_key(person_name: &str, date: &str) -> String {
    format!("{person_name}-{date}")
}

/// One absent person on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAbsence {
    /// Day as stored (`YYYY-MM-DD`)
    pub date: String,
    /// Key of this day's remark
    pub remark_key: String,
    /// Overtime hours worked on their behalf that day
    pub total_hours: f64,
    /// Overtime pay that day
    pub total_deduction: f64,
    /// Remark for the day, empty when none
    pub remark: String,
    /// Overtime records covering this day
    pub record_ids: Vec<String>,
}

/// Everything one absent person was covered for.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsenceSummary {
    /// Grouping key
    pub key: AbsenceKey,
    /// Display name of the absent person
    pub person_name: String,
    /// Overtime hours worked on their behalf
    pub total_hours: f64,
    /// Overtime pay charged to them
    pub total_deduction: f64,
    /// Per-day breakdown, most recent first
    pub daily: Vec<DailyAbsence>,
    /// Every overtime record in the group
    pub record_ids: Vec<String>,
}

/// The edited state of one day of absence.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAbsenceEdit {
    /// Day of the absence
    pub date: NaiveDate,
    /// Name of the person who was absent
    pub absent_person_name: String,
    /// New hours per overtime record id; records not listed keep their hours
    pub hours: Vec<(String, f64)>,
    /// Remark, empty to remove it
    pub remark: String,
}

fn group_by_key(records: &[OvertimeRecord]) -> Vec<(AbsenceKey, Vec<&OvertimeRecord>)> {
    let mut index: HashMap<AbsenceKey, usize> = HashMap::new();
    let mut groups: Vec<(AbsenceKey, Vec<&OvertimeRecord>)> = Vec::new();

    for record in records {
        let Some(key) = AbsenceKey::for_record(record) else {
            continue;
        };
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }

    groups
}

fn daily_breakdown(person_name: &str, records: &[&OvertimeRecord], remarks: &Remarks) -> Vec<DailyAbsence> {
    let mut by_date: BTreeMap<&str, Vec<&OvertimeRecord>> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date.as_str()).or_default().push(*record);
    }

    // BTreeMap iterates ascending; ISO dates sort chronologically as strings.
    by_date
        .into_iter()
        .rev()
        .map(|(date, day_records)| {
            let OvertimeTotals {
                total_hours,
                total_pay,
            } = totals(day_records.iter().copied());
            let key = remark_key(person_name, date);
            DailyAbsence {
                date: date.to_string(),
                remark: remarks.get(&key).cloned().unwrap_or_default(),
                remark_key: key,
                total_hours,
                total_deduction: total_pay,
                record_ids: day_records.iter().map(|r| r.id.clone()).collect(),
            }
        })
        .collect()
}

/// Groups overtime records by the absent person they covered for.
///
/// The display name is the matching employee's name, else the name carried on the first
/// record, else `Unknown`. Summaries are sorted by name, case-insensitively.
#[must_use]
pub fn aggregate_absences(
    records: &[OvertimeRecord],
    employees: &[Employee],
    remarks: &Remarks,
) -> Vec<AbsenceSummary> {
    let mut summaries: Vec<AbsenceSummary> = group_by_key(records)
        .into_iter()
        .map(|(key, group)| {
            let person_name = employees
                .iter()
                .find(|e| key.matches(e))
                .map(|e| e.name.clone())
                .or_else(|| {
                    group
                        .first()
                        .and_then(|r| r.absent_name())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "Unknown".to_string());

            let OvertimeTotals {
                total_hours,
                total_pay,
            } = totals(group.iter().copied());

            AbsenceSummary {
                daily: daily_breakdown(&person_name, &group, remarks),
                record_ids: group.iter().map(|r| r.id.clone()).collect(),
                key,
                person_name,
                total_hours,
                total_deduction: total_pay,
            }
        })
        .collect();

    summaries.sort_by_key(|s| s.person_name.to_lowercase());
    summaries
}

/// Grand totals across every absence summary.
#[must_use]
pub fn absence_totals(summaries: &[AbsenceSummary]) -> OvertimeTotals {
    summaries
        .iter()
        .fold(OvertimeTotals::default(), |mut acc, summary| {
            acc.total_hours += summary.total_hours;
            acc.total_pay += summary.total_deduction;
            acc
        })
}

/// Deletes every overtime record of an absent person together with their remarks.
#[must_use]
pub fn delete_absence_group(
    records: &[OvertimeRecord],
    remarks: &Remarks,
    summary: &AbsenceSummary,
) -> (Vec<OvertimeRecord>, Remarks) {
    let mut stale: Vec<String> = summary
        .daily
        .iter()
        .map(|day| day.remark_key.clone())
        .collect();
    stale.extend(
        records
            .iter()
            .filter(|r| summary.record_ids.contains(&r.id))
            .map(|r| remark_key(r.absent_name().unwrap_or_default(), &r.date)),
    );

    let kept = records
        .iter()
        .filter(|r| !summary.record_ids.contains(&r.id))
        .cloned()
        .collect();
    let mut remarks = remarks.clone();
    for key in &stale {
        remarks.remove(key);
    }

    debug!(person = %summary.person_name, removed = summary.record_ids.len(), "Deleted absence group");
    (kept, remarks)
}

/// Deletes one day of absence: its overtime records and its remark.
#[must_use]
pub fn delete_daily_absence(
    records: &[OvertimeRecord],
    remarks: &Remarks,
    day: &DailyAbsence,
) -> (Vec<OvertimeRecord>, Remarks) {
    let kept = records
        .iter()
        .filter(|r| !day.record_ids.contains(&r.id))
        .cloned()
        .collect();
    let mut remarks = remarks.clone();
    remarks.remove(&day.remark_key);
    (kept, remarks)
}

/// Applies an edit to one day of absence.
///
/// Every record of the day moves to the new date and absent person (the absent id is
/// resolved by employee name and cleared for untracked people), listed hours are applied
/// with totals recomputed, and the remark is re-keyed: the stale key is removed before the
/// new one is written.
pub fn edit_daily_absence(
    records: &[OvertimeRecord],
    remarks: &Remarks,
    employees: &[Employee],
    day: &DailyAbsence,
    edit: &DailyAbsenceEdit,
) -> Result<(Vec<OvertimeRecord>, Remarks)> {
    if let Some((unknown, _)) = edit
        .hours
        .iter()
        .find(|(id, _)| !day.record_ids.contains(id))
    {
        return Err(Error::OvertimeRecordNotFound { id: unknown.clone() });
    }

    let person_name = edit.absent_person_name.trim().to_string();
    if person_name.is_empty() {
        return Err(Error::validation("Absent employee name cannot be empty"));
    }

    let absent_id = employees
        .iter()
        .find(|e| e.name == person_name)
        .map(|e| e.id.clone());
    let date = edit.date.format(DATE_FORMAT).to_string();

    let updated = records
        .iter()
        .map(|record| {
            if !day.record_ids.contains(&record.id) {
                return record.clone();
            }
            let mut edited = record.clone();
            edited.date.clone_from(&date);
            edited.absent_employee_name = Some(person_name.clone());
            edited.absent_employee_id.clone_from(&absent_id);
            match edit.hours.iter().find(|(id, _)| id == &record.id) {
                Some((_, hours)) => edited.set_hours(*hours),
                None => edited.recompute_total(),
            }
            edited
        })
        .collect();

    let new_key = remark_key(&person_name, &date);
    let mut remarks = remarks.clone();
    if day.remark_key != new_key {
        remarks.remove(&day.remark_key);
    }
    if edit.remark.is_empty() {
        remarks.remove(&new_key);
    } else {
        remarks.insert(new_key, edit.remark.clone());
    }

    Ok((updated, remarks))
}

/// Absence deductions per absent person for one month.
#[must_use]
pub fn monthly_absence_deductions(
    records: &[OvertimeRecord],
    period: PayPeriod,
) -> HashMap<AbsenceKey, f64> {
    let mut deductions = HashMap::new();
    for record in records {
        if !record.parsed_date().is_some_and(|d| period.contains(d)) {
            continue;
        }
        if let Some(key) = AbsenceKey::for_record(record) {
            *deductions.entry(key).or_insert(0.0) += record.total_amount;
        }
    }
    deductions
}

/// Looks up an employee's monthly absence deduction, by id first and then by name.
#[must_use]
pub fn absence_deduction_for(employee: &Employee, deductions: &HashMap<AbsenceKey, f64>) -> f64 {
    deductions
        .get(&AbsenceKey::ByEmployeeId(employee.id.clone()))
        .or_else(|| deductions.get(&AbsenceKey::ByName(employee.name.clone())))
        .copied()
        .unwrap_or(0.0)
}
