//! Parameterised query descriptions.
//!
//! A [`Query`] is a driver-neutral statement: one table or view, an ordered
//! column list and conjunctive filters. Drivers either render it with
//! [`Query::to_sql`] and bind [`Query::params`], or evaluate it structurally
//! as [`SnapshotSource`](crate::SnapshotSource) does.

use std::fmt;

use patron_common::Value;

/// A filter applied to one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column IN (values...)`.
    In { column: String, values: Vec<Value> },
    /// `column = value`.
    Eq { column: String, value: Value },
}

impl Filter {
    /// The filtered column.
    pub fn column(&self) -> &str {
        match self {
            Filter::In { column, .. } | Filter::Eq { column, .. } => column,
        }
    }
}

/// A `SELECT` over a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    columns: Vec<String>,
    filters: Vec<Filter>,
}

impl Query {
    /// Create a query selecting `columns` from `table`.
    pub fn new<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            filters: Vec::new(),
        }
    }

    /// Add an `IN` filter.
    pub fn filter_in(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In {
            column: column.into(),
            values,
        });
        self
    }

    /// Add an equality filter.
    pub fn filter_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Table or view name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Selected columns, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Filters, in order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Render Oracle-style SQL with positional binds.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        let mut bind = 0usize;
        let mut clauses = Vec::with_capacity(self.filters.len());

        for filter in &self.filters {
            match filter {
                Filter::In { values, .. } if values.is_empty() => {
                    clauses.push("1 = 0".to_string());
                }
                Filter::In { column, values } => {
                    let binds: Vec<String> = values
                        .iter()
                        .map(|_| {
                            bind += 1;
                            format!(":{}", bind)
                        })
                        .collect();
                    clauses.push(format!("{} IN ({})", column, binds.join(", ")));
                }
                Filter::Eq { column, .. } => {
                    bind += 1;
                    clauses.push(format!("{} = :{}", column, bind));
                }
            }
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql
    }

    /// Bind values in positional order.
    pub fn params(&self) -> Vec<&Value> {
        self.filters
            .iter()
            .flat_map(|filter| match filter {
                Filter::In { values, .. } => values.iter().collect::<Vec<_>>(),
                Filter::Eq { value, .. } => vec![value],
            })
            .collect()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_without_filters() {
        let query = Query::new("ALMA_EMAIL", ["EMAIL_PIDM", "EMAIL_ADDRESS"]);
        assert_eq!(query.to_sql(), "SELECT EMAIL_PIDM, EMAIL_ADDRESS FROM ALMA_EMAIL");
        assert!(query.params().is_empty());
    }

    #[test]
    fn test_to_sql_binds_in_order() {
        let query = Query::new("ACU.SZBSFTP3", ["SFTP_LINE"])
            .filter_in("LINE_NO", vec![Value::Integer(0), Value::Integer(1)])
            .filter_eq("FILE_TYPE", "put");

        assert_eq!(
            query.to_sql(),
            "SELECT SFTP_LINE FROM ACU.SZBSFTP3 WHERE LINE_NO IN (:1, :2) AND FILE_TYPE = :3"
        );
        assert_eq!(
            query.params(),
            vec![&Value::Integer(0), &Value::Integer(1), &Value::from("put")]
        );
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let query = Query::new("T", ["A"]).filter_in("A", Vec::new());
        assert_eq!(query.to_sql(), "SELECT A FROM T WHERE 1 = 0");
    }
}
