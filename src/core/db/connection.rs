/// Connection Facade Module
///
/// This module owns the single SQLite connection behind the facade, applies
/// construction-time options, and exposes literal quoting and the raw handle.

use crate::core::db::escape::{quote_literal, TypeHint};
use crate::core::db::global::{self, SharedDatabase};
use crate::core::db::query::QueryExecutor;
use crate::core::{DaoError, Result};
use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Busy timeout applied when default options are enabled and none is configured.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Construction-time options for [`Database::open`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Path to the database file, `:memory:`, or a `file:` URI
    pub target: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Apply the facade's own defaults on top of `pragmas`
    pub apply_default_options: bool,
    pub read_only: bool,
    pub busy_timeout_ms: Option<u64>,
    /// Statements run verbatim right after the connection opens
    pub pragmas: Vec<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            target: ":memory:".to_string(),
            username: None,
            password: None,
            apply_default_options: true,
            read_only: false,
            busy_timeout_ms: None,
            pragmas: Vec::new(),
        }
    }
}

impl ConnectionConfig {
    /// Config for `target` with every other option at its default.
    pub fn new(target: impl Into<String>) -> Self {
        ConnectionConfig {
            target: target.into(),
            ..ConnectionConfig::default()
        }
    }

    fn open_flags(&self) -> OpenFlags {
        let base = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        };
        base | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }

    fn busy_timeout(&self) -> Option<Duration> {
        match (self.busy_timeout_ms, self.apply_default_options) {
            (Some(ms), _) => Some(Duration::from_millis(ms)),
            (None, true) => Some(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS)),
            (None, false) => None,
        }
    }
}

/// The connection facade: sole owner of one open SQLite session.
pub struct Database {
    conn: Connection,
    target: String,
}

impl Database {
    /// Opens a connection described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `DaoError::Connection` if the driver cannot open the target or
    /// rejects one of the startup statements.
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        let target = config.target.clone();
        let connection_err = |source| DaoError::Connection {
            target: target.clone(),
            source,
        };

        if config.username.is_some() || config.password.is_some() {
            warn!(
                "Credentials supplied for {} are ignored: SQLite has no authentication",
                config.target
            );
        }

        let conn =
            Connection::open_with_flags(&config.target, config.open_flags()).map_err(connection_err)?;

        if let Some(timeout) = config.busy_timeout() {
            conn.busy_timeout(timeout).map_err(connection_err)?;
        }
        if config.apply_default_options {
            conn.execute_batch("PRAGMA foreign_keys = ON;")
                .map_err(connection_err)?;
        }
        for pragma in &config.pragmas {
            conn.execute_batch(pragma).map_err(connection_err)?;
        }

        info!("Opened database {}", config.target);
        Ok(Database { conn, target })
    }

    /// Opens a private in-memory database with default options.
    pub fn open_in_memory() -> Result<Self> {
        Database::open(&ConnectionConfig::default())
    }

    /// Opens a database and installs it as the process-wide active facade,
    /// replacing any previous one.
    pub fn open_active(config: &ConnectionConfig) -> Result<SharedDatabase> {
        Ok(global::install(Database::open(config)?))
    }

    /// The target this facade was opened with.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The owned driver connection, for direct access.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// A query/result layer over this facade's connection.
    pub fn executor(&self) -> QueryExecutor<'_> {
        QueryExecutor::new(&self.conn)
    }

    /// Formats `value` as a literal, `NULL` when absent.
    ///
    /// Only for SQL that cannot use bound parameters.
    pub fn escape(&self, value: Option<&str>, hint: TypeHint) -> String {
        quote_literal(value, hint)
    }

    /// Stringifies `value` and quotes it as text.
    pub fn encode(&self, value: impl fmt::Display) -> String {
        self.escape(Some(&value.to_string()), TypeHint::Text)
    }

    /// Rowid of the most recent successful INSERT on this connection.
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("target", &self.target)
            .finish()
    }
}
