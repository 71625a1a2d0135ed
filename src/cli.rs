//! Command-line front end: open a database, run one statement, print the
//! chosen result shape as JSON.

use crate::config::{default_config_path, load_config, Config};
use crate::core::db::row::value_to_json;
use crate::core::db::{ColumnSelector, Database, Params, QueryExecutor, Value};
use crate::core::{DaoError, Result};
use rusqlite::types::{FromSql, FromSqlResult, ValueRef};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

pub const USAGE: &str =
    "usage: daolite [--config <file>] [--column <index|name>] <target> <exec|legacy|all|one|column|pairs|scalar|count> <sql> [param ...]";

/// Result shape requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Exec,
    Legacy,
    All,
    One,
    Column,
    Pairs,
    Scalar,
    Count,
}

impl Shape {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "exec" => Some(Shape::Exec),
            "legacy" => Some(Shape::Legacy),
            "all" => Some(Shape::All),
            "one" => Some(Shape::One),
            "column" => Some(Shape::Column),
            "pairs" => Some(Shape::Pairs),
            "scalar" => Some(Shape::Scalar),
            "count" => Some(Shape::Count),
            _ => None,
        }
    }
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config_path: Option<String>,
    pub target: String,
    pub shape: Shape,
    pub sql: String,
    pub params: Params,
    /// Column read by the `column` and `scalar` shapes; the first by default.
    pub column: ColumnSelector,
}

impl Invocation {
    /// Parses arguments, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut args = args.iter();
        let mut config_path = None;
        let mut column = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            if arg == "--config" {
                let path = args
                    .next()
                    .ok_or_else(|| DaoError::Command("--config needs a file path".to_string()))?;
                config_path = Some(path.clone());
            } else if arg == "--column" {
                let selector = args
                    .next()
                    .ok_or_else(|| DaoError::Command("--column needs an index or a name".to_string()))?;
                column = Some(parse_column(selector));
            } else {
                positional.push(arg.as_str());
            }
        }

        let (target, shape, sql, rest) = match positional.as_slice() {
            [target, shape, sql, rest @ ..] => (*target, *shape, *sql, rest),
            _ => return Err(DaoError::Command(USAGE.to_string())),
        };
        let shape = Shape::parse(shape)
            .ok_or_else(|| DaoError::Command(format!("unknown shape `{}`\n{}", shape, USAGE)))?;

        if shape == Shape::Legacy && !rest.is_empty() {
            return Err(DaoError::Command(
                "the legacy shape runs its SQL unbound and takes no parameters".to_string(),
            ));
        }
        if column.is_some() && !matches!(shape, Shape::Column | Shape::Scalar) {
            return Err(DaoError::Command(
                "--column applies to the column and scalar shapes only".to_string(),
            ));
        }

        Ok(Invocation {
            config_path,
            target: target.to_string(),
            shape,
            sql: sql.to_string(),
            params: Params::from(rest.iter().map(|p| parse_param(p)).collect::<Vec<_>>()),
            column: column.unwrap_or_default(),
        })
    }
}

/// Integer first, then real, otherwise text.
pub fn parse_param(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Real(f)
    } else {
        Value::Text(raw.to_string())
    }
}

/// A non-negative integer selects by position, anything else by name.
pub fn parse_column(raw: &str) -> ColumnSelector {
    match raw.parse::<usize>() {
        Ok(idx) => ColumnSelector::Index(idx),
        Err(_) => ColumnSelector::Name(raw.to_string()),
    }
}

/// Any SQLite value rendered as a JSON object key.
#[derive(Debug, PartialEq, Eq, Hash)]
struct JsonKey(String);

impl FromSql for JsonKey {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let key = match value {
            ValueRef::Null => "null".to_string(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => f.to_string(),
            ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
            ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        };
        Ok(JsonKey(key))
    }
}

/// Runs the invocation against its database and returns pretty JSON.
pub fn run(invocation: &Invocation) -> Result<String> {
    let mut config = match &invocation.config_path {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                debug!("Using config at {:?}", path);
                load_config(path)?
            }
            None => Config::default(),
        },
    };
    config.connection.target = invocation.target.clone();

    let db = Database::open(&config.connection)?;
    let output = shape_output(db.executor(), invocation)?;
    Ok(serde_json::to_string_pretty(&output)?)
}

fn shape_output(exec: QueryExecutor<'_>, inv: &Invocation) -> Result<serde_json::Value> {
    let (sql, params) = (inv.sql.as_str(), &inv.params);
    let output = match inv.shape {
        Shape::Exec => {
            let cursor = exec.execute(sql, params)?;
            let summary = json!({
                "sql": cursor.sql(),
                "columns": cursor.column_names(),
                "changes": cursor.changes(),
            });
            cursor.close();
            summary
        }
        Shape::Legacy => serde_json::to_value(exec.legacy_query(sql)?)?,
        Shape::All => serde_json::to_value(exec.query_all(sql, params)?)?,
        Shape::One => serde_json::to_value(exec.query_one(sql, params)?)?,
        Shape::Column => {
            let values: Vec<Value> = exec.query_column(sql, params, inv.column.clone())?;
            values.iter().map(value_to_json).collect()
        }
        Shape::Pairs => {
            let pairs: HashMap<JsonKey, Value> = exec.query_key_pair(sql, params)?;
            let object: serde_json::Map<String, serde_json::Value> = pairs
                .into_iter()
                .map(|(key, value)| (key.0, value_to_json(&value)))
                .collect();
            serde_json::Value::Object(object)
        }
        Shape::Scalar => {
            let value: Option<Value> = exec.query_scalar(sql, params, inv.column.clone())?;
            value.as_ref().map(value_to_json).unwrap_or(serde_json::Value::Null)
        }
        Shape::Count => json!(exec.query_count(sql, params)?),
    };
    Ok(output)
}
