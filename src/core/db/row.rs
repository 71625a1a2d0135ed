//! Row representation shared by every result shape.
//!
//! A `Row` keeps column order from the statement and behaves like an
//! associative array for name lookups: when a result carries the same column
//! name twice, the later column wins.

use crate::core::db::hydrate::HydrationError;
use rusqlite::types::{FromSql, Value, ValueRef};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// One materialized record: column names paired with owned values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row over a shared column list.
    ///
    /// `values` must line up with `columns`; rows produced by a cursor share
    /// one column list.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Row { columns, values }
    }

    /// Builds a row from `(column, value)` pairs, mostly useful in tests.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Row {
            columns: columns.into(),
            values,
        }
    }

    pub(crate) fn from_driver(columns: &Arc<[String]>, row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(Value::from(row.get_ref(idx)?));
        }
        Ok(Row::new(Arc::clone(columns), values))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of `name`, matched case-sensitively. The last duplicate wins.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().rposition(|c| c == name)
    }

    /// Value of the column called `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.index_of(name).map(|idx| &self.values[idx])
    }

    /// Value at the zero-based column position.
    pub fn value_at(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Converts the named column with the driver's `FromSql` rules.
    ///
    /// # Errors
    ///
    /// `HydrationError::MissingColumn` when no column has that exact name,
    /// `HydrationError::InvalidType` when the stored value does not convert.
    pub fn get<T: FromSql>(&self, name: &str) -> Result<T, HydrationError> {
        let value = self
            .value(name)
            .ok_or_else(|| HydrationError::MissingColumn(name.to_string()))?;
        convert(name, value)
    }

    /// Converts the column at `idx`, see [`Row::get`].
    pub fn get_at<T: FromSql>(&self, idx: usize) -> Result<T, HydrationError> {
        let value = self
            .value_at(idx)
            .ok_or_else(|| HydrationError::MissingColumn(format!("#{}", idx)))?;
        convert(&self.columns[idx], value)
    }

    /// Iterates `(column, value)` pairs in statement order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Converts the row into a JSON object keyed by column name.
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value_to_json(value)))
            .collect()
    }
}

fn convert<T: FromSql>(column: &str, value: &Value) -> Result<T, HydrationError> {
    T::column_result(ValueRef::from(value)).map_err(|e| HydrationError::InvalidType {
        column: column.to_string(),
        message: e.to_string(),
    })
}

/// Maps a SQLite value onto JSON. Blobs become byte arrays and non-finite
/// reals become `null`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(t) => serde_json::Value::String(t.clone()),
        Value::Blob(b) => serde_json::Value::from(b.clone()),
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value_to_json(value))?;
        }
        map.end()
    }
}
