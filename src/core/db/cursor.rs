//! Forward-only cursor over one executed statement.
//!
//! Opening a `Cursor` runs the SQL: every statement is stepped, its rows are
//! materialized and the prepared statement is finalized before `open`
//! returns. Driver failures (including those raised while stepping rows)
//! therefore surface from `open`, and no statement outlives it, whatever the
//! caller does with the cursor afterwards.

use crate::core::db::params::Params;
use crate::core::db::row::Row;
use crate::core::{DaoError, Result};
use rusqlite::{Batch, Connection, Statement};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// How many rows a row-producing statement is stepped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fetch {
    All,
    /// Stop after the first row. Data-changing statements still complete.
    First,
}

/// An executed statement whose rows have not been consumed yet.
pub struct Cursor {
    sql: String,
    columns: Arc<[String]>,
    rows: VecDeque<Row>,
    changes: usize,
}

/// What running one prepared statement produced.
struct Outcome {
    columns: Arc<[String]>,
    rows: VecDeque<Row>,
    changes: usize,
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome {
            columns: Arc::from(Vec::new()),
            rows: VecDeque::new(),
            changes: 0,
        }
    }
}

fn run(conn: &Connection, mut stmt: Statement<'_>, fetch: Fetch) -> rusqlite::Result<Outcome> {
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = VecDeque::new();
    let changes = if columns.is_empty() {
        stmt.raw_execute()?
    } else {
        let mut driver_rows = stmt.raw_query();
        while let Some(row) = driver_rows.next()? {
            rows.push_back(Row::from_driver(&columns, row)?);
            if fetch == Fetch::First {
                break;
            }
        }
        drop(driver_rows);
        if stmt.readonly() {
            0
        } else {
            conn.changes() as usize
        }
    };

    stmt.finalize()?;
    Ok(Outcome {
        columns,
        rows,
        changes,
    })
}

impl Cursor {
    /// Runs `sql` and buffers its result.
    ///
    /// With empty `params` the SQL may be a script: its statements run in
    /// order and the cursor carries the last one's columns and rows, while
    /// `changes` sums over all of them. Bound `params` require exactly one
    /// statement.
    pub(crate) fn open(
        conn: &Connection,
        operation: &'static str,
        sql: &str,
        params: &Params,
        fetch: Fetch,
    ) -> Result<Self> {
        debug!("{}: executing `{}` with {} parameter(s)", operation, sql, params.len());
        let failed = |e: rusqlite::Error| DaoError::execution(operation, sql, e);

        let mut batch = Batch::new(conn, sql);
        let mut outcome = Outcome::default();
        let mut changes = 0;

        if params.is_empty() {
            while let Some(stmt) = batch.next().map_err(failed)? {
                outcome = run(conn, stmt, fetch).map_err(failed)?;
                changes += outcome.changes;
            }
        } else {
            let mut stmt = batch
                .next()
                .map_err(failed)?
                .ok_or_else(|| failed(rusqlite::Error::InvalidParameterCount(params.len(), 0)))?;
            // Anything after the first statement, even unpreparable text, is a second statement.
            if !matches!(batch.next(), Ok(None)) {
                return Err(failed(rusqlite::Error::MultipleStatement));
            }
            params.bind(&mut stmt).map_err(failed)?;
            outcome = run(conn, stmt, fetch).map_err(failed)?;
            changes = outcome.changes;
        }

        Ok(Cursor {
            sql: sql.to_string(),
            columns: outcome.columns,
            rows: outcome.rows,
            changes,
        })
    }

    /// The SQL text this cursor was opened with.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Rows inserted, updated or deleted while the cursor was opened.
    pub fn changes(&self) -> usize {
        self.changes
    }

    /// Reads rows from where the previous read stopped.
    pub fn rows(&mut self) -> CursorRows<'_> {
        CursorRows {
            columns: Arc::clone(&self.columns),
            rows: &mut self.rows,
        }
    }

    /// Releases the cursor together with any rows not read yet.
    pub fn close(self) {
        debug!("closing cursor for `{}` with {} unread row(s)", self.sql, self.rows.len());
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("sql", &self.sql)
            .field("columns", &self.columns)
            .field("unread", &self.rows.len())
            .field("changes", &self.changes)
            .finish()
    }
}

/// Borrowed row iterator over a [`Cursor`]. Each row is yielded once.
pub struct CursorRows<'c> {
    columns: Arc<[String]>,
    rows: &'c mut VecDeque<Row>,
}

impl CursorRows<'_> {
    /// Column names shared by every row this iterator yields.
    pub fn columns(&self) -> &Arc<[String]> {
        &self.columns
    }
}

impl Iterator for CursorRows<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rows.len(), Some(self.rows.len()))
    }
}
