/// Daolite Error Module
///
/// This module defines the error taxonomy for the connection facade and the
/// query/result layer. Driver failures are wrapped minimally so the original
/// SQLite diagnostic is always preserved.
use crate::core::db::hydrate::HydrationError;
use thiserror::Error;

/// Error type for every fallible facade operation.
///
/// "No rows matched" is never an error: shaping operations report it as an
/// empty container or `None`. Only the conditions below propagate:
/// - Opening or configuring the connection
/// - Executing a statement (syntax, constraints, lost connectivity)
/// - Selecting a column or shape the result does not have
/// - Using the process-wide accessor before anything was installed
/// - Hydrating a row into a caller type
#[derive(Error, Debug)]
pub enum DaoError {
    /// The driver could not open or configure the session
    #[error("Connection error for `{target}`: {source}")]
    Connection {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// SQL execution failed; never retried or swallowed
    #[error("{operation} failed for `{sql}`: {source}")]
    Execution {
        operation: &'static str,
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A column selector named a column absent from the result
    #[error("Column {selector} is out of range ({available} columns available)")]
    ColumnOutOfRange { selector: String, available: usize },

    /// The result does not have the shape an operation requires
    #[error("{operation} requires at least {expected} columns, result has {found}")]
    InvalidShape {
        operation: &'static str,
        expected: usize,
        found: usize,
    },

    /// The process-wide accessor was used before a database was installed
    #[error("No active database has been installed")]
    NotInitialized,

    /// Row hydration failed in the hydration strategy
    #[error("Hydration error: {0}")]
    Hydration(#[from] HydrationError),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Command-line validation errors
    #[error("Command error: {0}")]
    Command(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DaoError {
    /// Wraps a driver error raised while running `sql` on behalf of `operation`.
    pub(crate) fn execution(operation: &'static str, sql: &str, source: rusqlite::Error) -> Self {
        DaoError::Execution {
            operation,
            sql: sql.to_string(),
            source,
        }
    }
}

/// Type alias for Result to use DaoError as the error type.
pub type Result<T> = std::result::Result<T, DaoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let exec_err = DaoError::execution(
            "execute",
            "SELECT * FROM missing",
            rusqlite::Error::InvalidQuery,
        );
        let msg = exec_err.to_string();
        assert!(msg.contains("execute failed"));
        assert!(msg.contains("SELECT * FROM missing"));

        let range_err = DaoError::ColumnOutOfRange {
            selector: "index 3".to_string(),
            available: 2,
        };
        assert!(range_err.to_string().contains("index 3"));

        let shape_err = DaoError::InvalidShape {
            operation: "query_key_pair",
            expected: 2,
            found: 1,
        };
        assert!(shape_err.to_string().contains("at least 2 columns"));

        assert!(DaoError::NotInitialized.to_string().contains("No active database"));
    }

    #[test]
    fn test_error_source_is_preserved() {
        use std::error::Error as _;

        let err = DaoError::Connection {
            target: "/nowhere/db.sqlite".to_string(),
            source: rusqlite::Error::InvalidPath("/nowhere/db.sqlite".into()),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let dao_err: DaoError = io_err.into();
        match dao_err {
            DaoError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }

        let hydration_err = HydrationError::MissingColumn("email".to_string());
        let dao_err: DaoError = hydration_err.into();
        match dao_err {
            DaoError::Hydration(HydrationError::MissingColumn(name)) => assert_eq!(name, "email"),
            _ => panic!("Expected Hydration error"),
        }
    }
}
