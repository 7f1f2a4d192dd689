//! Error type for capability discovery.
//!
//! Only failures on the minors source itself surface here. Lines that do not
//! parse are reported through [`crate::report::LineReporter`] and never become
//! errors.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias for capability discovery.
pub type Result<T> = std::result::Result<T, MigError>;

#[derive(Error, Debug)]
pub enum MigError {
    /// The minors file exists but could not be opened.
    #[error("error opening MIG minors file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The minors file was opened but reading it failed part way.
    #[error("error reading MIG minors file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MigError {
    pub fn path(&self) -> &Path {
        match self {
            MigError::Open { path, .. } | MigError::Read { path, .. } => path,
        }
    }
}
