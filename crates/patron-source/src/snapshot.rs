//! Query executor over a JSON snapshot of the source views.
//!
//! A snapshot is a JSON object mapping table names to arrays of row objects:
//!
//! ```json
//! {
//!   "ALMA_EMAIL": [
//!     { "EMAIL_PIDM": 372080, "PREFERRED": "Y", "EMAIL_ADDRESS": "jane@example.edu", "EMAIL_TYPE": "PERS" }
//!   ]
//! }
//! ```
//!
//! Filters are evaluated with the same loose number/text comparison the
//! database applies, and row order is preserved.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use patron_common::{PersonKey, Value};
use serde_json::Value as JsonValue;

use crate::query::Filter;
use crate::{Error, Query, QueryExecutor, Result, ResultSet};

/// Default deadline for a single statement.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default)]
struct Table {
    columns: Vec<String>,
    rows: Vec<HashMap<String, Value>>,
}

/// In-memory tables loaded from a snapshot document.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    tables: HashMap<String, Table>,
    timeout: Duration,
}

impl SnapshotSource {
    /// Load a snapshot from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a snapshot document.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: JsonValue = serde_json::from_str(text)?;
        let JsonValue::Object(tables) = document else {
            return Err(snapshot_error("snapshot", "top level must be an object of tables"));
        };

        let mut parsed = HashMap::with_capacity(tables.len());
        for (name, rows) in tables {
            let JsonValue::Array(rows) = rows else {
                return Err(snapshot_error(&name, "table must be an array of rows"));
            };

            let mut table = Table::default();
            for row in rows {
                let JsonValue::Object(fields) = row else {
                    return Err(snapshot_error(&name, "row must be an object"));
                };

                let mut converted = HashMap::with_capacity(fields.len());
                for (column, value) in fields {
                    let column = column.to_ascii_uppercase();
                    if !table.columns.contains(&column) {
                        table.columns.push(column.clone());
                    }
                    converted.insert(column, json_to_value(&name, value)?);
                }
                table.rows.push(converted);
            }
            parsed.insert(name, table);
        }

        log::debug!("Loaded snapshot with {} tables", parsed.len());

        Ok(Self {
            tables: parsed,
            timeout: DEFAULT_QUERY_TIMEOUT,
        })
    }

    /// Set the per-statement deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Table names present in the snapshot.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl QueryExecutor for SnapshotSource {
    fn execute(&self, query: &Query) -> Result<ResultSet> {
        let started = Instant::now();
        let table = self.tables.get(query.table()).ok_or_else(|| Error::Query {
            query: query.to_string(),
            message: "table or view does not exist".to_string(),
        })?;

        for filter in query.filters() {
            if !table.columns.is_empty() && !has_column(&table.columns, filter.column()) {
                return Err(Error::Query {
                    query: query.to_string(),
                    message: format!("invalid identifier {}", filter.column()),
                });
            }
        }

        // Only columns the table actually has; decoding reports the rest.
        let columns: Vec<String> = query
            .columns()
            .iter()
            .filter(|c| table.columns.is_empty() || has_column(&table.columns, c))
            .cloned()
            .collect();

        let mut rows = Vec::new();
        for row in &table.rows {
            if started.elapsed() >= self.timeout {
                return Err(Error::Timeout {
                    query: query.to_string(),
                    timeout: self.timeout,
                });
            }
            if query.filters().iter().all(|f| matches_filter(row, f)) {
                rows.push(
                    columns
                        .iter()
                        .map(|c| lookup(row, c).cloned().unwrap_or_default())
                        .collect(),
                );
            }
        }

        log::debug!("{}: {} rows", query, rows.len());
        Ok(ResultSet::new(columns, rows))
    }
}

fn snapshot_error(table: &str, message: &str) -> Error {
    Error::Query {
        query: table.to_string(),
        message: message.to_string(),
    }
}

fn has_column(columns: &[String], name: &str) -> bool {
    columns.iter().any(|c| c.eq_ignore_ascii_case(name))
}

fn lookup<'a>(row: &'a HashMap<String, Value>, column: &str) -> Option<&'a Value> {
    row.get(&column.to_ascii_uppercase())
}

fn matches_filter(row: &HashMap<String, Value>, filter: &Filter) -> bool {
    let cell = lookup(row, filter.column()).unwrap_or(&Value::Null);
    match filter {
        Filter::In { values, .. } => values.iter().any(|v| loosely_equal(cell, v)),
        Filter::Eq { value, .. } => loosely_equal(cell, value),
    }
}

/// SQL comparison: NULL never matches, numeric text compares as a number.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return false;
    }
    match (PersonKey::from_value(a), PersonKey::from_value(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => a.to_string() == b.to_string(),
    }
}

fn json_to_value(table: &str, value: JsonValue) -> Result<Value> {
    Ok(match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Text(b.to_string()),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Decimal(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::Text(s),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            return Err(snapshot_error(table, "nested values are not supported"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Email;
    use crate::FromRow;

    const SNAPSHOT: &str = r#"{
        "ALMA_EMAIL": [
            { "EMAIL_PIDM": "372080", "PREFERRED": "Y", "EMAIL_ADDRESS": "jane@example.edu", "EMAIL_TYPE": "PERS" },
            { "EMAIL_PIDM": 375036, "PREFERRED": null, "EMAIL_ADDRESS": "sam@example.edu" },
            { "EMAIL_PIDM": 372080, "PREFERRED": null, "EMAIL_ADDRESS": "jd@example.edu", "EMAIL_TYPE": "WORK" }
        ]
    }"#;

    #[test]
    fn test_execute_preserves_order_and_projects() {
        let source = SnapshotSource::from_json(SNAPSHOT).unwrap();
        let set = source.execute(&Email::query()).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.columns()[0], "EMAIL_PIDM");
        assert_eq!(set.rows()[1][3], Value::Null);
        assert_eq!(set.rows()[2][2], Value::from("jd@example.edu"));
    }

    #[test]
    fn test_filter_compares_numbers_loosely() {
        let source = SnapshotSource::from_json(SNAPSHOT).unwrap();
        let query = Email::query().filter_in("EMAIL_PIDM", vec![Value::Integer(372080)]);
        let set = source.execute(&query).unwrap();
        assert_eq!(set.len(), 2);

        let query = Email::query().filter_eq("EMAIL_PIDM", "375036");
        assert_eq!(source.execute(&query).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_table_is_query_error() {
        let source = SnapshotSource::from_json("{}").unwrap();
        assert!(matches!(
            source.execute(&Email::query()),
            Err(Error::Query { .. })
        ));
    }

    #[test]
    fn test_scan_past_deadline_times_out() {
        let source = SnapshotSource::from_json(SNAPSHOT)
            .unwrap()
            .with_timeout(Duration::ZERO);
        assert!(matches!(
            source.execute(&Email::query()),
            Err(Error::Timeout { timeout, .. }) if timeout == Duration::ZERO
        ));
    }

    #[test]
    fn test_rejects_malformed_documents() {
        assert!(SnapshotSource::from_json("[]").is_err());
        assert!(SnapshotSource::from_json(r#"{"T": {}}"#).is_err());
        assert!(SnapshotSource::from_json(r#"{"T": [{"A": [1]}]}"#).is_err());
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, SNAPSHOT).unwrap();

        let source = SnapshotSource::open(&path).unwrap();
        assert_eq!(source.table_names().collect::<Vec<_>>(), vec![Email::TABLE]);
    }
}
