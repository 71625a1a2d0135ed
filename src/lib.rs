// Core infrastructure modules
pub mod core;

// Outer surfaces
pub mod cli;
pub mod config;

#[cfg(test)]
mod test_utils;

pub use crate::core::db::{
    ColumnSelector, ConnectionConfig, Cursor, Database, FromRow, LegacyResult, Params,
    QueryExecutor, Row, Value,
};
pub use crate::core::{DaoError, Result};
