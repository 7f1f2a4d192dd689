#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const CAPS_ROOT: &str = "/proc/driver/nvidia/capabilities";
pub const DEV_ROOT: &str = "/dev/nvidia-caps";

// Minors listing as the driver prints it for one GPU split into a single GI
// with one CI, plus a trailing line no grammar accepts.
pub const SCENARIO_MINORS: &str =
    "gpu0/gi1/ci2/access 10\ngpu0/gi1/access 5\nconfig 0\nmonitor 1\ngarbage\n";

// Temporary directory holding a minors file; removed on drop.
pub struct MinorsFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl MinorsFixture {
    pub fn new(contents: impl AsRef<[u8]>) -> Result<Self> {
        let dir = TempDir::new().context("failed to allocate temp dir")?;
        let path = dir.path().join("mig-minors");
        fs::write(&path, contents)
            .with_context(|| format!("failed to write fixture at {}", path.display()))?;
        Ok(Self { dir, path })
    }

    // Lays the file out as `<root>/proc/driver/nvidia-caps/mig-minors`.
    pub fn under_host_root(contents: impl AsRef<[u8]>) -> Result<Self> {
        let dir = TempDir::new().context("failed to allocate temp dir")?;
        let caps_dir = dir.path().join("proc/driver/nvidia-caps");
        fs::create_dir_all(&caps_dir)?;
        let path = caps_dir.join("mig-minors");
        fs::write(&path, contents)?;
        Ok(Self { dir, path })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn missing_path(&self) -> PathBuf {
        self.dir.path().join("does-not-exist")
    }
}

pub fn cap(suffix: &str) -> String {
    format!("{CAPS_ROOT}/{suffix}")
}

pub fn dev(minor: u32) -> String {
    format!("{DEV_ROOT}/nvidia-cap{minor}")
}

pub fn mig_caps_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mig-caps"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run {:?}", cmd.get_program()))?;
    Ok(output)
}

pub fn running_as_root() -> bool {
    Command::new("id")
        .arg("-u")
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim() == "0")
        .unwrap_or(false)
}
