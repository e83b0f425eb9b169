//! Common types for patron.
//!
//! This crate provides the foundational types shared by every patron crate:
//!
//! - [`Value`] - A single column value as returned by the relational source
//! - [`PersonKey`] - The canonical numeric parent key used for joins
//! - [`present_text`] - The one field-presence rule applied to every scalar
//! - [`preferred_token`] - Canonical rendering of "preferred" flags

mod error;
mod key;
mod text;
mod value;

pub use error::{Error, Result};
pub use key::PersonKey;
pub use text::{is_truthy, preferred_token, present_text};
pub use value::Value;
