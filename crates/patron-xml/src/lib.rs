//! Patron document builder and XML serializer.
//!
//! [`DocumentBuilder`] merges a person with its preloaded contact groups into
//! an [`XmlNode`] tree; [`to_xml_string`] renders the tree without an XML
//! declaration. [`XmlNode::from_xml`] parses rendered output back for checks.
//!
//! # Example
//!
//! ```no_run
//! use patron_source::{fetch_persons, ContactIndexes, SnapshotSource};
//! use patron_xml::{to_xml_string, DocumentBuilder};
//!
//! let source = SnapshotSource::open("snapshot.json")?;
//! let persons = fetch_persons(&source, None)?;
//! let contacts = ContactIndexes::load(&source)?;
//!
//! let batch = DocumentBuilder::new(&contacts).build_all(&persons);
//! println!("{}", to_xml_string(&batch.root)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod document;
mod error;
mod node;
mod reader;
mod writer;

pub use document::{
    role_block, BatchDocument, DocumentBuilder, ACCOUNT_TYPE, BARCODE_ID_TYPE, PRIMARY_ID_TYPE,
    RECORD_TYPE, ROLE_SCOPE, ROLE_STATUS, ROLE_TYPE, ROOT_TAG,
};
pub use error::{Error, Result};
pub use node::XmlNode;
pub use writer::{to_xml_string, write_xml};
