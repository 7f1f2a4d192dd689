//! Resolve NVIDIA MIG capability gates to the device nodes that back them.
//!
//! [`resolve`] reads `/proc/driver/nvidia-caps/mig-minors` and returns a
//! [`CapabilityMap`] from virtual capability paths such as
//! `/proc/driver/nvidia/capabilities/gpu0/mig/gi1/access` to device nodes
//! such as `/dev/nvidia-caps/nvidia-cap5`.

pub mod error;
pub mod mig;
pub mod report;

pub use error::{MigError, Result};
pub use mig::{
    CapabilityLayout, CapabilityMap, LineClassification, classify_line, resolve,
    resolve_from_path, resolve_from_reader, resolve_with,
};
pub use report::{LineReporter, RecordingReporter, SilentReporter, SkippedLine, TracingReporter};

use std::env;
use std::env::VarError;
use std::path::PathBuf;

/// Environment override for the minors file location.
pub const ENV_MINORS_PATH: &str = "MIG_CAPS_MINORS_PATH";

/// Minors file override from the environment; empty values are ignored.
pub fn minors_override_from_env() -> Option<PathBuf> {
    match env::var(ENV_MINORS_PATH) {
        Ok(value) if !value.is_empty() => Some(PathBuf::from(value)),
        Ok(_) => None,
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(os)) => Some(PathBuf::from(os)),
    }
}
