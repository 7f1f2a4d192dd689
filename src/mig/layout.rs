//! Driver-defined filesystem locations used by capability discovery.

use std::path::{Path, PathBuf};

/// Root of the virtual capability files the driver checks access against.
pub const NVIDIA_CAPABILITIES_PATH: &str = "/proc/driver/nvidia/capabilities";
/// Pseudo-file listing one capability gate and its minor number per line.
pub const NVCAPS_MIG_MINORS_PATH: &str = "/proc/driver/nvidia-caps/mig-minors";
/// Directory holding the `nvidia-cap<N>` character devices.
pub const NVCAPS_DEVICE_PATH: &str = "/dev/nvidia-caps";

/// Where the minors file is read from and how keys and values are rooted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityLayout {
    pub minors_path: PathBuf,
    pub capabilities_root: String,
    pub device_root: String,
}

impl Default for CapabilityLayout {
    fn default() -> Self {
        Self {
            minors_path: PathBuf::from(NVCAPS_MIG_MINORS_PATH),
            capabilities_root: NVIDIA_CAPABILITIES_PATH.to_string(),
            device_root: NVCAPS_DEVICE_PATH.to_string(),
        }
    }
}

impl CapabilityLayout {
    /// Driver layout with the minors file read beneath `host_root`.
    ///
    /// Only the source moves: keys and device paths stay host-canonical since
    /// the device allocator binds them on the host.
    pub fn with_host_root(host_root: &Path) -> Self {
        let relative = Path::new(NVCAPS_MIG_MINORS_PATH)
            .strip_prefix("/")
            .unwrap_or(Path::new(NVCAPS_MIG_MINORS_PATH));
        Self {
            minors_path: host_root.join(relative),
            ..Self::default()
        }
    }

    /// Driver layout reading the minors file from `path`.
    pub fn with_minors_path(path: impl Into<PathBuf>) -> Self {
        Self {
            minors_path: path.into(),
            ..Self::default()
        }
    }

    pub fn ci_access_path(&self, gpu: u32, gi: u32, ci: u32) -> String {
        format!(
            "{}/gpu{gpu}/mig/gi{gi}/ci{ci}/access",
            self.capabilities_root
        )
    }

    pub fn gi_access_path(&self, gpu: u32, gi: u32) -> String {
        format!("{}/gpu{gpu}/mig/gi{gi}/access", self.capabilities_root)
    }

    pub fn config_path(&self) -> String {
        format!("{}/mig/config", self.capabilities_root)
    }

    pub fn monitor_path(&self) -> String {
        format!("{}/mig/monitor", self.capabilities_root)
    }

    pub fn device_path(&self, minor: u32) -> String {
        format!("{}/nvidia-cap{minor}", self.device_root)
    }
}
