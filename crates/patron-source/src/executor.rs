//! Query execution boundary and typed row decoding.

use patron_common::Value;

use crate::{Error, Query, Result};

/// Ordered rows with named columns, as returned by a driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Create a result set. Each row must have one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, in query order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode every row into a typed record.
    ///
    /// Column presence is checked once for the whole set, then rows are read
    /// by position.
    pub fn decode<R: FromRow>(self, query: &Query) -> Result<Vec<R>> {
        let map = ColumnMap::resolve(query, &self.columns, R::COLUMNS)?;
        self.rows
            .into_iter()
            .map(|row| R::from_row(&mut map.project(row)))
            .collect()
    }
}

/// Anything that can run a [`Query`].
///
/// Implementations must be `Sync`: person fetch and child preloads run
/// concurrently against the same executor.
pub trait QueryExecutor: Sync {
    /// Execute the query and return all rows.
    fn execute(&self, query: &Query) -> Result<ResultSet>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn execute(&self, query: &Query) -> Result<ResultSet> {
        (**self).execute(query)
    }
}

/// Positions of a record's columns within a result set.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    indices: Vec<usize>,
}

impl ColumnMap {
    /// Locate every wanted column, matching names case-insensitively.
    pub fn resolve(query: &Query, columns: &[String], wanted: &[&str]) -> Result<Self> {
        let indices = wanted
            .iter()
            .map(|name| {
                columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(name))
                    .ok_or_else(|| Error::MissingColumn {
                        query: query.to_string(),
                        column: (*name).to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { indices })
    }

    /// Pick this map's columns out of a row, in record order.
    pub fn project(&self, mut row: Vec<Value>) -> Fields {
        let values = self
            .indices
            .iter()
            .map(|&i| row.get_mut(i).map(std::mem::take).unwrap_or_default())
            .collect::<Vec<_>>();
        Fields {
            values: values.into_iter(),
        }
    }
}

/// Column values of one row, consumed in declaration order.
#[derive(Debug)]
pub struct Fields {
    values: std::vec::IntoIter<Value>,
}

impl Fields {
    /// Build from values already in declaration order.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Take the next column value.
    #[inline]
    pub fn next_value(&mut self) -> Value {
        self.values.next().unwrap_or(Value::Null)
    }
}

/// A record decoded from one row of a known query shape.
pub trait FromRow: Sized {
    /// Source table or view.
    const TABLE: &'static str;
    /// Columns read, in the order [`FromRow::from_row`] consumes them.
    const COLUMNS: &'static [&'static str];

    /// Decode one row.
    fn from_row(fields: &mut Fields) -> Result<Self>;

    /// The unfiltered query for this record.
    fn query() -> Query {
        Query::new(Self::TABLE, Self::COLUMNS.iter().copied())
    }
}
