//! Patron - person extract, XML export and packaged delivery.
//!
//! This crate ties the patron crates together into one run:
//!
//! - [`patron_common`] - Column values, person keys, field-presence rule
//! - [`patron_source`] - Query boundary, typed records, join preloading
//! - [`patron_xml`] - Document builder and XML serializer
//! - [`patron_package`] - Atomic zip and text artifacts
//! - [`patron_delivery`] - Archive, network copy, remote transfer, retention
//!
//! # Example
//!
//! ```no_run
//! use patron::prelude::*;
//!
//! let source = SnapshotSource::open("snapshot.json")?;
//! let config = RunConfig::new("data/alma", "alma");
//!
//! let report = run_users(&config, &source, &SftpCommand::default(), chrono::Local::now());
//! println!("{}", report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod pipeline;
mod report;

// Re-export all sub-crates
pub use patron_common as common;
pub use patron_delivery as delivery;
pub use patron_package as package;
pub use patron_source as source;
pub use patron_xml as xml;

pub use config::{Environment, RunConfig, ARTIFACT_STAMP_FORMAT, FLAT_STAMP_FORMAT};
pub use error::{Error, Result};
pub use pipeline::{check_source, run_lines, run_users, TableCheck};
pub use report::{Halt, RunReport, Stage};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{check_source, run_lines, run_users, RunConfig, RunReport};
    pub use patron_common::{PersonKey, Value};
    pub use patron_delivery::{Outcome, RemoteTransport, SftpCommand, TransferTarget};
    pub use patron_source::{QueryExecutor, SnapshotSource};
    pub use patron_xml::{to_xml_string, XmlNode};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
