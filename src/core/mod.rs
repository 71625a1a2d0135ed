/// Core Module for Daolite
///
/// This module contains the connection facade, the query/result layer and
/// the shared error type they report through.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DaoError, Result};
