//! Delivery steps for packaged patron artifacts.
//!
//! Each step reports an [`Outcome`] instead of an error so that one failing
//! destination never prevents the others from being attempted:
//!
//! - [`archive`] copies into a dated directory under the archive root
//! - [`deliver`] copies into an optional network directory
//! - [`transfer`] pushes to an optional remote endpoint
//! - [`prune`] deletes expired files from the working directory

mod copy;
mod error;
mod outcome;
mod prune;
mod transfer;

pub use copy::{archive, copy_into, deliver, ARCHIVE_DATE_FORMAT};
pub use error::{Error, Result};
pub use outcome::Outcome;
pub use prune::{prune, PruneSummary, DEFAULT_RETENTION_DAYS};
pub use transfer::{
    transfer, RemoteSession, RemoteTransport, SftpCommand, TransferTarget,
    DEFAULT_TRANSFER_TIMEOUT,
};
