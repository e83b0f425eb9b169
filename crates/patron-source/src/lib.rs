//! Source reader and join preloader for patron extracts.
//!
//! The relational store is reached through the [`QueryExecutor`] trait. Every
//! query shape has a typed record ([`Person`], [`Address`], [`Email`],
//! [`Phone`], [`FlatLine`]) whose columns are validated once per result set.
//! Child categories are loaded once per run into [`ChildIndex`]es keyed by the
//! normalised [`PersonKey`](patron_common::PersonKey).
//!
//! # Example
//!
//! ```no_run
//! use patron_source::{fetch_persons, ContactIndexes, SnapshotSource};
//!
//! let source = SnapshotSource::open("snapshot.json")?;
//! let persons = fetch_persons(&source, None)?;
//! let contacts = ContactIndexes::load(&source)?;
//! println!("{} persons, {} emails", persons.len(), contacts.emails.row_count());
//! # Ok::<(), patron_source::Error>(())
//! ```

mod error;
mod executor;
mod preload;
mod query;
mod records;
mod snapshot;

pub use error::{Error, Result};
pub use executor::{ColumnMap, Fields, FromRow, QueryExecutor, ResultSet};
pub use preload::{
    fetch_file_name, fetch_flat_lines, fetch_persons, preload, preload_query, ChildIndex,
    ContactIndexes,
};
pub use query::{Filter, Query};
pub use records::{
    Address, ChildRow, Email, FlatLine, Person, Phone, UploadFileName, BODY_SEGMENT,
    HEADER_SEGMENT,
};
pub use snapshot::{SnapshotSource, DEFAULT_QUERY_TIMEOUT};
