//! Storage entry entity - One named JSON collection per row.
//! The application persists each of its collections (employees, payslips,
//! overtime records, ...) as a JSON document under a fixed key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Storage entry database model - a key and its JSON document
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_entry")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Collection key (e.g., `"factory_employees"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Collection serialized as JSON text
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this collection was last written
    pub updated_at: DateTime,
}

/// `StorageEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
