/// Query Execution Module
///
/// This module runs one statement per call and shapes its cursor into a
/// typed result: the legacy aggregate, every row, one column, a key/value
/// map, the first row, a single value, or a row count.
///
/// "No rows matched" is a normal result: plural shapes come back empty and
/// singular shapes come back as `None`. Only execution failures, unusable
/// selectors and hydration failures are errors.

use crate::core::db::cursor::{Cursor, Fetch};
use crate::core::db::hydrate::FromRow;
use crate::core::db::params::Params;
use crate::core::db::row::Row;
use crate::core::{DaoError, Result};
use rusqlite::types::FromSql;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Identifies one column of a result, by zero-based position or exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    Index(usize),
    Name(String),
}

impl Default for ColumnSelector {
    fn default() -> Self {
        ColumnSelector::Index(0)
    }
}

impl From<usize> for ColumnSelector {
    fn from(idx: usize) -> Self {
        ColumnSelector::Index(idx)
    }
}

impl From<&str> for ColumnSelector {
    fn from(name: &str) -> Self {
        ColumnSelector::Name(name.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(name: String) -> Self {
        ColumnSelector::Name(name)
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Index(idx) => write!(f, "index {}", idx),
            ColumnSelector::Name(name) => write!(f, "`{}`", name),
        }
    }
}

impl ColumnSelector {
    /// Resolves the selector against a result's column names.
    ///
    /// Names match case-sensitively; with duplicates the last column wins,
    /// like [`Row::value`].
    pub fn resolve(&self, columns: &[String]) -> Result<usize> {
        let found = match self {
            ColumnSelector::Index(idx) => Some(*idx).filter(|idx| *idx < columns.len()),
            ColumnSelector::Name(name) => columns.iter().rposition(|c| c == name),
        };
        found.ok_or_else(|| DaoError::ColumnOutOfRange {
            selector: self.to_string(),
            available: columns.len(),
        })
    }
}

/// Aggregate result of [`QueryExecutor::legacy_query`].
///
/// `row` is the first element of `rows` (or `None`) and `num_rows` is
/// `rows.len()`. `affected_rows` carries the change count of a statement
/// without result columns, which never yields rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LegacyResult {
    pub rows: Vec<Row>,
    pub row: Option<Row>,
    pub num_rows: usize,
    pub affected_rows: usize,
}

impl LegacyResult {
    pub fn new(rows: Vec<Row>, affected_rows: usize) -> Self {
        LegacyResult {
            row: rows.first().cloned(),
            num_rows: rows.len(),
            rows,
            affected_rows,
        }
    }
}

/// Query execution service that operates on a database connection
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor<'a> {
    connection: &'a Connection,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new QueryExecutor for the given connection
    pub fn new(connection: &'a Connection) -> Self {
        QueryExecutor { connection }
    }

    /// Executes `sql` and hands back the open cursor.
    ///
    /// The SQL has run to completion by the time this returns. With empty
    /// `params` it may hold several statements, which run in order; the
    /// cursor then carries the result of the last one. Otherwise every value
    /// is bound to a single statement first.
    ///
    /// # Errors
    ///
    /// Returns `DaoError::Execution` for malformed SQL, binding mismatches,
    /// a second statement next to bound `params`, constraint violations or
    /// driver failures, including those raised while producing rows.
    pub fn execute(&self, sql: &str, params: &Params) -> Result<Cursor> {
        Cursor::open(self.connection, "execute", sql, params, Fetch::All)
    }

    /// Runs a script of one or more statements without binding or results.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection
            .execute_batch(sql)
            .map_err(|e| DaoError::execution("execute_batch", sql, e))
    }

    /// Opens a cursor, shapes it with `f`, then closes it. An error from `f`
    /// drops the cursor, which releases its rows just the same.
    fn with_cursor<T>(
        &self,
        operation: &'static str,
        sql: &str,
        params: &Params,
        fetch: Fetch,
        f: impl FnOnce(&mut Cursor) -> Result<T>,
    ) -> Result<T> {
        let mut cursor = Cursor::open(self.connection, operation, sql, params, fetch)?;
        let shaped = f(&mut cursor)?;
        cursor.close();
        Ok(shaped)
    }

    /// Runs `sql` unbound and drains it into a [`LegacyResult`].
    pub fn legacy_query(&self, sql: &str) -> Result<LegacyResult> {
        self.with_cursor("legacy_query", sql, &Params::None, Fetch::All, |cursor| {
            let affected_rows = cursor.changes();
            let rows = cursor.rows().collect();
            Ok(LegacyResult::new(rows, affected_rows))
        })
    }

    /// Every row as a column-name → value mapping.
    pub fn query_all(&self, sql: &str, params: &Params) -> Result<Vec<Row>> {
        self.with_cursor("query_all", sql, params, Fetch::All, |cursor| {
            Ok(cursor.rows().collect())
        })
    }

    /// Every row hydrated into `T`.
    pub fn query_all_as<T: FromRow>(&self, sql: &str, params: &Params) -> Result<Vec<T>> {
        self.with_cursor("query_all", sql, params, Fetch::All, |cursor| {
            let mut hydrated = Vec::new();
            for row in cursor.rows() {
                hydrated.push(T::from_row(&row)?);
            }
            Ok(hydrated)
        })
    }

    /// Values of one column across all rows.
    ///
    /// # Errors
    ///
    /// `DaoError::ColumnOutOfRange` when `column` is not part of the result,
    /// even if no rows matched.
    pub fn query_column<T: FromSql>(
        &self,
        sql: &str,
        params: &Params,
        column: impl Into<ColumnSelector>,
    ) -> Result<Vec<T>> {
        let column = column.into();
        self.with_cursor("query_column", sql, params, Fetch::All, |cursor| {
            let idx = column.resolve(cursor.column_names())?;
            let mut values = Vec::new();
            for row in cursor.rows() {
                values.push(row.get_at(idx)?);
            }
            Ok(values)
        })
    }

    /// Maps the first column of each row onto the second.
    ///
    /// Later rows overwrite earlier ones on duplicate keys.
    pub fn query_key_pair<K, V>(&self, sql: &str, params: &Params) -> Result<HashMap<K, V>>
    where
        K: FromSql + Eq + Hash,
        V: FromSql,
    {
        self.query_key_pair_by(sql, params, ColumnSelector::Index(0), ColumnSelector::Index(1))
    }

    /// Like [`query_key_pair`](Self::query_key_pair) with explicit key and
    /// value columns.
    ///
    /// # Errors
    ///
    /// `DaoError::InvalidShape` when the result has fewer than two columns,
    /// `DaoError::ColumnOutOfRange` when a selector does not resolve.
    pub fn query_key_pair_by<K, V>(
        &self,
        sql: &str,
        params: &Params,
        key: impl Into<ColumnSelector>,
        value: impl Into<ColumnSelector>,
    ) -> Result<HashMap<K, V>>
    where
        K: FromSql + Eq + Hash,
        V: FromSql,
    {
        let (key, value) = (key.into(), value.into());
        self.with_cursor("query_key_pair", sql, params, Fetch::All, |cursor| {
            if cursor.column_count() < 2 {
                return Err(DaoError::InvalidShape {
                    operation: "query_key_pair",
                    expected: 2,
                    found: cursor.column_count(),
                });
            }
            let key_idx = key.resolve(cursor.column_names())?;
            let value_idx = value.resolve(cursor.column_names())?;

            let mut pairs = HashMap::new();
            for row in cursor.rows() {
                pairs.insert(row.get_at(key_idx)?, row.get_at(value_idx)?);
            }
            Ok(pairs)
        })
    }

    /// The first row, or `None` when nothing matched. Later rows are never read.
    pub fn query_one(&self, sql: &str, params: &Params) -> Result<Option<Row>> {
        self.first_row("query_one", sql, params)
    }

    /// The first row hydrated into `T`, or `None` when nothing matched.
    pub fn query_one_as<T: FromRow>(&self, sql: &str, params: &Params) -> Result<Option<T>> {
        match self.first_row("query_one", sql, params)? {
            Some(row) => Ok(Some(T::from_row(&row)?)),
            None => Ok(None),
        }
    }

    fn first_row(&self, operation: &'static str, sql: &str, params: &Params) -> Result<Option<Row>> {
        self.with_cursor(operation, sql, params, Fetch::First, |cursor| {
            Ok(cursor.rows().next())
        })
    }

    /// One value from the first row.
    ///
    /// `None` means no row matched. A matched row whose value is `0`, `''` or
    /// `NULL` (with `T = Option<_>` or `Value`) is returned as that value.
    ///
    /// # Errors
    ///
    /// `DaoError::ColumnOutOfRange` when `column` is not part of the result.
    /// The check runs against the statement's columns, so it fails even when
    /// no row matched rather than reporting `None`.
    pub fn query_scalar<T: FromSql>(
        &self,
        sql: &str,
        params: &Params,
        column: impl Into<ColumnSelector>,
    ) -> Result<Option<T>> {
        self.scalar("query_scalar", sql, params, column.into())
    }

    fn scalar<T: FromSql>(
        &self,
        operation: &'static str,
        sql: &str,
        params: &Params,
        column: ColumnSelector,
    ) -> Result<Option<T>> {
        self.with_cursor(operation, sql, params, Fetch::First, |cursor| {
            let idx = column.resolve(cursor.column_names())?;
            match cursor.rows().next() {
                Some(row) => Ok(Some(row.get_at(idx)?)),
                None => Ok(None),
            }
        })
    }

    /// Number of rows `sql` produces, counted by the database.
    ///
    /// `sql` is wrapped as `SELECT COUNT(*) FROM (<sql>) AS T`, so it must be
    /// a single row-producing statement without a trailing semicolon.
    pub fn query_count(&self, sql: &str, params: &Params) -> Result<u64> {
        let wrapped = format!("SELECT COUNT(*) FROM ({}) AS T", sql);
        let count: Option<i64> = self.scalar("query_count", &wrapped, params, ColumnSelector::Index(0))?;
        Ok(count.map_or(0, |c| u64::try_from(c).unwrap_or(0)))
    }
}
