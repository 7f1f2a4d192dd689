//! MIG capability discovery.
//!
//! The NVIDIA driver gates access to MIG GPU instances, compute instances and
//! the global config/monitor functions behind virtual capability files. Each
//! gate is backed by a `/dev/nvidia-caps/nvidia-cap<N>` character device, and
//! the driver lists the gate-to-minor assignments in
//! `/proc/driver/nvidia-caps/mig-minors`. This module parses that file into a
//! [`CapabilityMap`] so a device allocator can look up the node to expose for
//! the gate it needs. A miss means the gate is unavailable on this host.

pub mod grammar;
pub mod layout;
pub mod resolver;

pub use grammar::{
    GRAMMARS, Grammar, LineClassification, classify_line, classify_line_with_grammar,
};
pub use layout::{
    CapabilityLayout, NVCAPS_DEVICE_PATH, NVCAPS_MIG_MINORS_PATH, NVIDIA_CAPABILITIES_PATH,
};
pub use resolver::{resolve, resolve_from_path, resolve_from_reader, resolve_with};

use serde::Serialize;
use std::collections::BTreeMap;

/// Snapshot of capability path to device node path, as of one resolve call.
///
/// Serializes as a flat JSON object keyed by capability path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilityMap {
    #[serde(skip)]
    layout: CapabilityLayout,
    entries: BTreeMap<String, String>,
}

impl CapabilityMap {
    pub(crate) fn new(layout: CapabilityLayout, entries: BTreeMap<String, String>) -> Self {
        Self { layout, entries }
    }

    pub(crate) fn empty(layout: CapabilityLayout) -> Self {
        Self::new(layout, BTreeMap::new())
    }

    /// Device node for a capability path, if the driver listed it.
    pub fn get(&self, capability_path: &str) -> Option<&str> {
        self.entries.get(capability_path).map(String::as_str)
    }

    pub fn gi_access(&self, gpu: u32, gi: u32) -> Option<&str> {
        self.get(&self.layout.gi_access_path(gpu, gi))
    }

    pub fn ci_access(&self, gpu: u32, gi: u32, ci: u32) -> Option<&str> {
        self.get(&self.layout.ci_access_path(gpu, gi, ci))
    }

    pub fn config(&self) -> Option<&str> {
        self.get(&self.layout.config_path())
    }

    pub fn monitor(&self) -> Option<&str> {
        self.get(&self.layout.monitor_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in capability-path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.entries
    }
}
