//! Field presence and flag rendering.
//!
//! Every scalar written into an export passes through [`present_text`]. Keeping
//! the rule in one place is what guarantees that blank source values never show
//! up as empty elements anywhere in the tree.

use crate::Value;

/// Return the trimmed text of a value, or `None` if it is NULL or blank.
///
/// ```
/// use patron_common::{present_text, Value};
///
/// assert_eq!(present_text(&Value::from("  Jane ")), Some("Jane".to_string()));
/// assert_eq!(present_text(&Value::from("   ")), None);
/// assert_eq!(present_text(&Value::Integer(0)), Some("0".to_string()));
/// ```
pub fn present_text(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }

    let text = value.to_string();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Truthiness of a flag column: NULL, zero and blank text are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Integer(v) => *v != 0,
        Value::Decimal(v) => *v != 0.0,
        Value::Text(s) => !s.trim().is_empty(),
        Value::Timestamp(_) => true,
    }
}

/// Render a "preferred" flag, or `None` when the attribute must be omitted.
///
/// Known yes/no spellings collapse to `true`/`false`; any other truthy text is
/// lower-cased.
pub fn preferred_token(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }

    let lowered = value.to_string().trim().to_lowercase();
    let token = match lowered.as_str() {
        "y" | "yes" | "t" | "true" | "1" => "true".to_string(),
        "n" | "no" | "f" | "false" | "0" => "false".to_string(),
        _ => lowered,
    };
    Some(token)
}
