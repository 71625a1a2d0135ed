/// Process-wide Active Database
///
/// Compatibility accessor for code that cannot be handed a [`Database`]
/// explicitly. Prefer passing the facade (or a [`SharedDatabase`]) to the
/// components that need it.
///
/// There is one slot per process. [`install`] replaces its content, it never
/// merges, so only one writer should install at a time. Access to the
/// installed facade is serialized through its mutex.

use crate::core::db::connection::Database;
use crate::core::{DaoError, Result};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// A facade shared between the global slot and its callers.
pub type SharedDatabase = Arc<Mutex<Database>>;

static ACTIVE: OnceCell<Mutex<Option<SharedDatabase>>> = OnceCell::new();

fn slot() -> MutexGuard<'static, Option<SharedDatabase>> {
    ACTIVE
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Installs `db` as the active facade, replacing the previous one.
pub fn install(db: Database) -> SharedDatabase {
    info!("Installing {} as the active database", db.target());
    let shared = Arc::new(Mutex::new(db));
    *slot() = Some(Arc::clone(&shared));
    shared
}

/// The most recently installed facade, if any.
pub fn active() -> Option<SharedDatabase> {
    slot().clone()
}

/// Like [`active`], but reports a missing facade as `DaoError::NotInitialized`.
pub fn require_active() -> Result<SharedDatabase> {
    active().ok_or(DaoError::NotInitialized)
}

/// Clears the slot and returns what it held. The connection closes once the
/// last handle to it is dropped.
pub fn teardown() -> Option<SharedDatabase> {
    let previous = slot().take();
    if previous.is_some() {
        info!("Active database torn down");
    }
    previous
}

/// Runs `f` against the active facade while holding its lock.
pub fn with_active<T>(f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
    let shared = require_active()?;
    let db = shared
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::connection::ConnectionConfig;
    use crate::core::db::params::Params;

    /// Serializes tests that touch the process-wide slot.
    static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

    fn lock_global() -> MutexGuard<'static, ()> {
        GLOBAL_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_accessor_before_install() {
        let _guard = lock_global();
        teardown();

        assert!(active().is_none());
        assert!(matches!(require_active(), Err(DaoError::NotInitialized)));
        let result = with_active(|db| Ok(db.target().to_string()));
        assert!(matches!(result, Err(DaoError::NotInitialized)));
    }

    #[test]
    fn test_last_installed_wins() {
        let _guard = lock_global();

        let first = Database::open_active(&ConnectionConfig::new(":memory:")).unwrap();
        let second = Database::open_active(&ConnectionConfig::new("file::memory:")).unwrap();

        let current = active().unwrap();
        assert!(Arc::ptr_eq(&current, &second));
        assert!(!Arc::ptr_eq(&current, &first));
        assert_eq!(
            with_active(|db| Ok(db.target().to_string())).unwrap(),
            "file::memory:"
        );

        assert!(teardown().is_some());
        assert!(active().is_none());
    }

    #[test]
    fn test_with_active_runs_queries() {
        let _guard = lock_global();
        install(Database::open_in_memory().unwrap());

        let answer: Option<i64> =
            with_active(|db| db.executor().query_scalar("SELECT 42", &Params::None, 0)).unwrap();
        assert_eq!(answer, Some(42));

        teardown();
    }
}
