//! Bound parameters for a query request.

use rusqlite::types::Value;
use rusqlite::Statement;

/// Parameters bound to a statement before it runs.
///
/// Positional values bind to `?`/`?N` placeholders in order. Named values
/// bind to `:name`, `@name` or `$name` placeholders; the name must include
/// its prefix character, as SQLite reports it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// No binding; the SQL runs as given
    #[default]
    None,
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Params {
    /// Builds positional parameters from anything convertible into `Value`.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Builds named parameters from `(name, value)` pairs.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Params::None => 0,
            Params::Positional(values) => values.len(),
            Params::Named(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binds every value onto `stmt`.
    ///
    /// Positional counts must match the statement's placeholder count, and
    /// every name must exist in the statement.
    pub(crate) fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        match self {
            Params::None => Ok(()),
            Params::Positional(values) => {
                let expected = stmt.parameter_count();
                if values.len() != expected {
                    return Err(rusqlite::Error::InvalidParameterCount(values.len(), expected));
                }
                for (idx, value) in values.iter().enumerate() {
                    stmt.raw_bind_parameter(idx + 1, value)?;
                }
                Ok(())
            }
            Params::Named(pairs) => {
                for (name, value) in pairs {
                    let idx = stmt
                        .parameter_index(name)?
                        .ok_or_else(|| rusqlite::Error::InvalidParameterName(name.clone()))?;
                    stmt.raw_bind_parameter(idx, value)?;
                }
                Ok(())
            }
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        if values.is_empty() {
            Params::None
        } else {
            Params::Positional(values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_constructors() {
        assert!(Params::None.is_empty());
        assert!(Params::from(Vec::new()).is_empty());

        let p = Params::positional([1i64, 2, 3]);
        assert_eq!(p.len(), 3);
        assert_eq!(
            p,
            Params::Positional(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );

        let n = Params::named([(":name", "Иван".to_string())]);
        assert_eq!(
            n,
            Params::Named(vec![(":name".to_string(), Value::Text("Иван".to_string()))])
        );
    }

    #[test]
    fn test_bind_rejects_wrong_count_and_unknown_name() {
        let conn = Connection::open_in_memory().unwrap();

        let mut stmt = conn.prepare("SELECT ?1 + ?2").unwrap();
        let err = Params::positional([1i64]).bind(&mut stmt).unwrap_err();
        assert!(matches!(err, rusqlite::Error::InvalidParameterCount(1, 2)));

        let mut stmt = conn.prepare("SELECT :a").unwrap();
        let err = Params::named([(":b", 1i64)]).bind(&mut stmt).unwrap_err();
        assert!(matches!(err, rusqlite::Error::InvalidParameterName(name) if name == ":b"));
    }
}
