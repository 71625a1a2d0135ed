//! Hydration strategy: turning a [`Row`] into a caller-defined type.
//!
//! Types opt in by implementing [`FromRow`]. Columns map onto fields by exact,
//! case-sensitive name. Two ready-made strategies are provided: manual
//! extraction through [`Row::get`], and [`deserialize`], which routes the row
//! through `serde` so `#[derive(Deserialize)]` structs hydrate directly (add
//! `#[serde(deny_unknown_fields)]` to reject unmapped columns).

use crate::core::db::row::Row;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failures reported by a hydration strategy.
#[derive(Error, Debug)]
pub enum HydrationError {
    /// The target requires a column the row does not carry
    #[error("missing column `{0}`")]
    MissingColumn(String),

    /// A column value could not be converted to the field type
    #[error("column `{column}` has an incompatible value: {message}")]
    InvalidType { column: String, message: String },

    /// The serde-backed strategy rejected the row
    #[error("cannot deserialize row: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Strategy-specific failure
    #[error("{0}")]
    Custom(String),
}

/// Builds `Self` from one materialized row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, HydrationError>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self, HydrationError> {
        Ok(row.clone())
    }
}

impl FromRow for serde_json::Map<String, serde_json::Value> {
    fn from_row(row: &Row) -> Result<Self, HydrationError> {
        Ok(row.to_json())
    }
}

/// Serde-backed strategy: the row becomes a JSON object which is then
/// deserialized into `T`.
pub fn deserialize<T: DeserializeOwned>(row: &Row) -> Result<T, HydrationError> {
    Ok(serde_json::from_value(serde_json::Value::Object(row.to_json()))?)
}
