/// Database Module
///
/// This module provides the connection facade and the query/result layer,
/// organized into focused submodules.
///
/// ## Architecture
///
/// - **Connection Facade** (`connection.rs`, `global.rs`, `escape.rs`): owns the
///   single SQLite connection, quotes literals, and optionally publishes the
///   facade process-wide
/// - **Query Execution** (`params.rs`, `cursor.rs`): binds parameters and runs
///   the SQL into a forward-only cursor over its buffered result
/// - **Result Shaping** (`query.rs`, `row.rs`, `hydrate.rs`): drains a cursor
///   into one of the result shapes, closing it on every path
///
/// ## Error Handling
///
/// All database operations use the standardized `DaoError` type.
pub mod connection;
pub mod cursor;
pub mod escape;
pub mod global;
pub mod hydrate;
pub mod params;
pub mod query;
pub mod row;

pub use connection::*;
pub use cursor::{Cursor, CursorRows};
pub use escape::{quote_identifier, quote_literal, TypeHint};
pub use hydrate::{FromRow, HydrationError};
pub use params::Params;
pub use query::*;
pub use row::Row;

pub use rusqlite::types::Value;
