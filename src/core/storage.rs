//! Persistent storage of the application collections.
//!
//! Each collection is a JSON document stored under a fixed key in the `storage_entry`
//! table. A document that cannot be parsed is logged and replaced by the collection's
//! default instead of failing the load, so one corrupted collection never locks the
//! user out of the rest.

use super::{cv, state::AppState};
use crate::{
    entities::{StorageEntry, storage_entry},
    errors::Result,
    models::EmployeeCv,
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Employee list
pub const EMPLOYEES_KEY: &str = "factory_employees";
/// Stored payslips
pub const PAYSLIPS_KEY: &str = "factory_payslips";
/// Overtime records
pub const OVERTIME_RECORDS_KEY: &str = "factory_overtime_records";
/// Settings singleton
pub const SETTINGS_KEY: &str = "factory_settings";
/// Notes board
pub const NOTES_KEY: &str = "factory_notes";
/// CV documents
pub const EMPLOYEE_CVS_KEY: &str = "factory_employee_cvs";
/// Remarks per absent person and date
pub const ABSENCE_REMARKS_KEY: &str = "factory_absence_remarks";
/// Employee categories
pub const CATEGORIES_KEY: &str = "factory_categories";
/// Category membership
pub const CATEGORIZED_EMPLOYEES_KEY: &str = "factory_categorized_employees";

/// Every key [`save_state`] writes.
pub const ALL_KEYS: [&str; 9] = [
    EMPLOYEES_KEY,
    PAYSLIPS_KEY,
    OVERTIME_RECORDS_KEY,
    SETTINGS_KEY,
    NOTES_KEY,
    EMPLOYEE_CVS_KEY,
    ABSENCE_REMARKS_KEY,
    CATEGORIES_KEY,
    CATEGORIZED_EMPLOYEES_KEY,
];

/// Reads the raw document stored under `key`.
pub async fn get_item<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let entry = StorageEntry::find()
        .filter(storage_entry::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(entry.map(|e| e.value))
}

/// Writes `value` under `key`, replacing any previous document.
pub async fn set_item<C>(db: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = StorageEntry::find()
        .filter(storage_entry::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(entry) = existing {
        let mut active_model: storage_entry::ActiveModel = entry.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let entry = storage_entry::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        };
        entry.insert(db).await?;
    }

    Ok(())
}

/// Deletes the document under `key`. Returns whether one existed.
pub async fn remove_item<C>(db: &C, key: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = StorageEntry::delete_many()
        .filter(storage_entry::Column::Key.eq(key))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Reads and parses the collection under `key`.
///
/// Returns `None` when nothing is stored or the stored document does not parse.
pub async fn load_collection<T, C>(db: &C, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    C: ConnectionTrait,
{
    let Some(raw) = get_item(db, key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "Failed to parse stored collection, using default");
            Ok(None)
        }
    }
}

/// Serializes and writes a collection under `key`.
pub async fn save_collection<T, C>(db: &C, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    C: ConnectionTrait,
{
    set_item(db, key, serde_json::to_string(value)?).await
}

/// Whether an employee collection has ever been saved.
pub async fn is_initialized(db: &DatabaseConnection) -> Result<bool> {
    Ok(get_item(db, EMPLOYEES_KEY).await?.is_some())
}

/// Loads CV documents, upgrading legacy ones and dropping those that cannot be read.
async fn load_cvs(db: &DatabaseConnection) -> Result<Vec<EmployeeCv>> {
    let raw: Vec<Value> = load_collection(db, EMPLOYEE_CVS_KEY)
        .await?
        .unwrap_or_default();

    Ok(raw
        .into_iter()
        .filter_map(|value| match cv::upgrade(value) {
            Ok(cv) => Some(cv),
            Err(e) => {
                warn!(error = %e, "Dropping unreadable CV document");
                None
            }
        })
        .collect())
}

/// Loads every collection; missing or corrupted ones take their defaults.
pub async fn load_state(db: &DatabaseConnection) -> Result<AppState> {
    let defaults = AppState::default();

    let state = AppState {
        employees: load_collection(db, EMPLOYEES_KEY).await?.unwrap_or_default(),
        payslips: load_collection(db, PAYSLIPS_KEY).await?.unwrap_or_default(),
        overtime_records: load_collection(db, OVERTIME_RECORDS_KEY)
            .await?
            .unwrap_or_default(),
        employee_cvs: load_cvs(db).await?,
        settings: load_collection(db, SETTINGS_KEY)
            .await?
            .unwrap_or(defaults.settings),
        notes: load_collection(db, NOTES_KEY).await?.unwrap_or_default(),
        absence_remarks: load_collection(db, ABSENCE_REMARKS_KEY)
            .await?
            .unwrap_or_default(),
        categories: load_collection(db, CATEGORIES_KEY)
            .await?
            .unwrap_or(defaults.categories),
        categorized_employees: load_collection(db, CATEGORIZED_EMPLOYEES_KEY)
            .await?
            .unwrap_or(defaults.categorized_employees),
    };

    debug!(
        employees = state.employees.len(),
        payslips = state.payslips.len(),
        overtime_records = state.overtime_records.len(),
        "Loaded application state"
    );
    Ok(state)
}

/// Writes every collection in one transaction.
pub async fn save_state(db: &DatabaseConnection, state: &AppState) -> Result<()> {
    let txn = db.begin().await?;

    save_collection(&txn, EMPLOYEES_KEY, &state.employees).await?;
    save_collection(&txn, PAYSLIPS_KEY, &state.payslips).await?;
    save_collection(&txn, OVERTIME_RECORDS_KEY, &state.overtime_records).await?;
    save_collection(&txn, EMPLOYEE_CVS_KEY, &state.employee_cvs).await?;
    save_collection(&txn, SETTINGS_KEY, &state.settings).await?;
    save_collection(&txn, NOTES_KEY, &state.notes).await?;
    save_collection(&txn, ABSENCE_REMARKS_KEY, &state.absence_remarks).await?;
    save_collection(&txn, CATEGORIES_KEY, &state.categories).await?;
    save_collection(&txn, CATEGORIZED_EMPLOYEES_KEY, &state.categorized_employees).await?;

    txn.commit().await?;
    info!("Saved application state");
    Ok(())
}

/// Deletes every stored collection in one transaction. Returns how many existed.
///
/// The store reads as uninitialized afterwards, so the next start seeds it again.
pub async fn clear_state(db: &DatabaseConnection) -> Result<usize> {
    let txn = db.begin().await?;
    let mut removed = 0;
    for key in ALL_KEYS {
        if remove_item(&txn, key).await? {
            removed += 1;
        }
    }
    txn.commit().await?;

    info!(removed, "Cleared application state");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{models::Settings, test_utils::*};

    #[tokio::test]
    async fn test_set_get_remove_item() -> Result<()> {
        let db = setup_test_db().await?;

        assert_eq!(get_item(&db, "k").await?, None);
        set_item(&db, "k", "1".to_string()).await?;
        set_item(&db, "k", "2".to_string()).await?;
        assert_eq!(get_item(&db, "k").await?.as_deref(), Some("2"));

        let rows = StorageEntry::find().all(&db).await?;
        assert_eq!(rows.len(), 1);

        assert!(remove_item(&db, "k").await?);
        assert!(!remove_item(&db, "k").await?);
        assert_eq!(get_item(&db, "k").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_state_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        let mut state = setup_with_employees();
        state.payslips = vec![test_payslip("emp-001", 2024, 3, 1000.0)];
        state.overtime_records =
            vec![test_overtime_record("ot-1", "emp-001", "2024-03-01", 2.0, 80.0)];
        state.employee_cvs = vec![cv::default_cv("emp-001")];
        state.settings.overtime_rate = 95.0;
        state
            .absence_remarks
            .insert("Karim Mia-2024-03-01".to_string(), "Sick".to_string());

        assert!(!is_initialized(&db).await?);
        save_state(&db, &state).await?;
        assert!(is_initialized(&db).await?);

        let loaded = load_state(&db).await?;
        assert_eq!(loaded, state);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_state_uninitializes_store() -> Result<()> {
        let db = setup_test_db().await?;
        save_state(&db, &setup_with_employees()).await?;
        set_item(&db, "unrelated", "1".to_string()).await?;

        assert_eq!(clear_state(&db).await?, ALL_KEYS.len());

        assert!(!is_initialized(&db).await?);
        assert_eq!(load_state(&db).await?, AppState::default());
        assert_eq!(get_item(&db, "unrelated").await?.as_deref(), Some("1"));
        assert_eq!(clear_state(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_store_loads_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        let state = load_state(&db).await?;
        assert_eq!(state, AppState::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_collection_falls_back_to_default() -> Result<()> {
        let db = setup_test_db().await?;
        save_collection(&db, EMPLOYEES_KEY, &setup_with_employees().employees).await?;
        set_item(&db, PAYSLIPS_KEY, "{not json".to_string()).await?;
        set_item(&db, SETTINGS_KEY, r#"{"overtimeRate": 70}"#.to_string()).await?;

        let state = load_state(&db).await?;

        assert_eq!(state.employees.len(), 3);
        assert!(state.payslips.is_empty());
        assert_eq!(state.settings.overtime_rate, 70.0);
        assert_eq!(state.settings.working_hours_per_day, Settings::default().working_hours_per_day);
        Ok(())
    }

    #[tokio::test]
    async fn test_imported_invalid_salary_survives_reload() -> Result<()> {
        let db = setup_test_db().await?;
        let mut state = AppState::default();
        let csv = "employeeId,name,department,designation,joiningDate,basicSalary\n\
                   F-1,One,A,B,2023-01-01,1200\n\
                   F-2,Two,A,B,2023-01-01,NaN\n";
        let imported = crate::core::employee::parse_employee_csv(csv.as_bytes())?;
        state.bulk_add_employees(imported);

        save_state(&db, &state).await?;
        let raw = get_item(&db, EMPLOYEES_KEY).await?.unwrap();
        assert!(!raw.contains("null"));

        let loaded = load_state(&db).await?;
        assert_eq!(loaded.employees.len(), 2);
        let two = loaded.employees.iter().find(|e| e.employee_id == "F-2").unwrap();
        assert_eq!(two.basic_salary, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_cvs_upgraded_on_load() -> Result<()> {
        let db = setup_test_db().await?;
        set_item(
            &db,
            EMPLOYEE_CVS_KEY,
            r#"[{"employeeId": "emp-001", "email": "rahim@example.com"}, 42]"#.to_string(),
        )
        .await?;

        let state = load_state(&db).await?;

        assert_eq!(state.employee_cvs.len(), 1);
        assert_eq!(state.employee_cvs[0].sections[0].id, "contact");
        assert_eq!(state.employee_cvs[0].sections[0].items.len(), 1);
        Ok(())
    }
}
