//! Literal and identifier quoting for SQL text that cannot use bound
//! parameters, such as dynamic identifiers. Prefer `Params` for any
//! user-controlled value.

/// How a literal should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeHint {
    /// Single-quoted string literal
    #[default]
    Text,
    /// Bare integer when the value parses as one, quoted text otherwise
    Integer,
    /// `1`/`0` for recognizable booleans, quoted text otherwise
    Boolean,
    /// Always the `NULL` token
    Null,
}

/// Formats `value` as a SQLite literal.
///
/// An absent value always renders as `NULL`, regardless of the hint.
///
/// # Examples
///
/// ```
/// use daolite::core::db::{quote_literal, TypeHint};
///
/// assert_eq!(quote_literal(Some("O'Brien"), TypeHint::Text), "'O''Brien'");
/// assert_eq!(quote_literal(None, TypeHint::Text), "NULL");
/// ```
pub fn quote_literal(value: Option<&str>, hint: TypeHint) -> String {
    let value = match value {
        Some(v) => v,
        None => return "NULL".to_string(),
    };

    match hint {
        TypeHint::Null => "NULL".to_string(),
        TypeHint::Integer => match value.trim().parse::<i64>() {
            Ok(i) => i.to_string(),
            Err(_) => quote_text(value),
        },
        TypeHint::Boolean => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => "1".to_string(),
            "0" | "false" | "no" | "off" | "" => "0".to_string(),
            _ => quote_text(value),
        },
        TypeHint::Text => quote_text(value),
    }
}

fn quote_text(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quotes a table or column name with double quotes.
pub fn quote_identifier(identifier: &str) -> String {
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_quoting() {
        assert_eq!(quote_literal(Some("plain"), TypeHint::Text), "'plain'");
        assert_eq!(quote_literal(Some("it's"), TypeHint::Text), "'it''s'");
        assert_eq!(quote_literal(Some(""), TypeHint::Text), "''");
        assert_eq!(quote_literal(Some("Иван"), TypeHint::Text), "'Иван'");
    }

    #[test]
    fn test_absent_value_is_null_token() {
        assert_eq!(quote_literal(None, TypeHint::Text), "NULL");
        assert_eq!(quote_literal(None, TypeHint::Integer), "NULL");
        assert_eq!(quote_literal(Some("x"), TypeHint::Null), "NULL");
    }

    #[test]
    fn test_integer_and_boolean_hints() {
        assert_eq!(quote_literal(Some(" 42 "), TypeHint::Integer), "42");
        assert_eq!(quote_literal(Some("42; DROP TABLE t"), TypeHint::Integer), "'42; DROP TABLE t'");
        assert_eq!(quote_literal(Some("TRUE"), TypeHint::Boolean), "1");
        assert_eq!(quote_literal(Some("off"), TypeHint::Boolean), "0");
        assert_eq!(quote_literal(Some("maybe"), TypeHint::Boolean), "'maybe'");
    }

    #[test]
    fn test_identifier_quoting() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
