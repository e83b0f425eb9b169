//! Column values returned by the relational source.
//!
//! The `Value` enum is the driver-neutral representation of one cell. Its
//! `Display` output is the text every downstream rule works from, so it
//! stringifies the way the source driver would.

use std::fmt;

use chrono::NaiveDateTime;

use crate::{Error, Result};

/// Layout used when rendering timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single value from a source row.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// Integral number.
    Integer(i64),
    /// Non-integral number (or a number the driver returned as float).
    Decimal(f64),
    /// Character data.
    Text(String),
    /// Date or timestamp column.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Check if this value is SQL NULL.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get this value as a string slice.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an integer.
    ///
    /// Decimals convert only when they have no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Integer(v) => Some(v),
            Value::Decimal(v) if v.is_finite() && v.fract() == 0.0 => {
                if v >= i64::MIN as f64 && v < i64::MAX as f64 {
                    Some(v as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Parse timestamp text in either `YYYY-MM-DD HH:MM:SS` or ISO `T` form.
    pub fn parse_timestamp(text: &str) -> Result<Self> {
        let text = text.trim();
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
            .map(Value::Timestamp)
            .map_err(|_| Error::InvalidTimestamp(text.to_string()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Decimal(v) => match self.as_i64() {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", v),
            },
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
