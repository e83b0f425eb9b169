//! Canonical person key.

use std::fmt;

use crate::{Error, Result, Value};

/// The numeric identifier that joins a person to its child rows.
///
/// Source views disagree on whether the key is a number or text, so every
/// lookup and every grouping goes through [`PersonKey::from_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonKey(i64);

impl PersonKey {
    /// Create a key from an integer.
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw integer.
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Coerce a source value into a key.
    ///
    /// Integers are taken as-is, integral decimals are narrowed and text is
    /// trimmed and parsed. Everything else is a malformed key.
    pub fn from_value(value: &Value) -> Result<Self> {
        let parsed = match value {
            Value::Integer(_) | Value::Decimal(_) => value.as_i64(),
            Value::Text(s) => s.trim().parse::<i64>().ok(),
            Value::Null | Value::Timestamp(_) => None,
        };

        parsed.map(Self).ok_or_else(|| Error::MalformedKey {
            value: match value {
                Value::Null => "NULL".to_string(),
                other => other.to_string(),
            },
        })
    }
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PersonKey {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
