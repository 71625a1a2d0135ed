/// # Test Utilities Module
///
/// Database fixtures shared by the unit tests. Every fixture owns its own
/// in-memory database, so tests stay isolated without extra locking.

use crate::core::db::{ConnectionConfig, Database, QueryExecutor};
use crate::core::Result;

/// Isolated database test fixture
pub struct DatabaseFixture {
    pub db: Database,
}

impl DatabaseFixture {
    /// Create an empty in-memory database
    pub fn new() -> Result<Self> {
        let db = Database::open(&ConnectionConfig::new(":memory:"))?;
        Ok(DatabaseFixture { db })
    }

    /// Table `test(id, name)` holding the single row `(1, 'Иван')`
    pub fn with_scenario() -> Result<Self> {
        let fixture = Self::new()?;
        fixture.executor().execute_batch(
            "
            CREATE TABLE test (
                id INTEGER PRIMARY KEY NOT NULL,
                name TEXT
            );
            INSERT INTO test (id, name) VALUES (1, 'Иван');
        ",
        )?;
        Ok(fixture)
    }

    /// Table `people(id, name, age)` with four rows, two of them over 30
    pub fn with_people() -> Result<Self> {
        let fixture = Self::new()?;
        fixture.executor().execute_batch(
            "
            CREATE TABLE people (
                id INTEGER PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                age INTEGER NOT NULL
            );
            INSERT INTO people (id, name, age) VALUES (1, 'Иван', 25);
            INSERT INTO people (id, name, age) VALUES (2, 'Пётр', 35);
            INSERT INTO people (id, name, age) VALUES (3, 'Анна', 40);
            INSERT INTO people (id, name, age) VALUES (4, 'Олег', 20);
        ",
        )?;
        Ok(fixture)
    }

    pub fn executor(&self) -> QueryExecutor<'_> {
        self.db.executor()
    }
}
