//! Print the MIG capability-to-device mapping for this host.
//!
//! Usage:
//!   mig-caps                          # full map as JSON
//!   mig-caps --gpu 0 --gi 1           # device node for one GI access gate
//!   mig-caps --gpu 0 --gi 1 --ci 2    # device node for one CI access gate
//!   mig-caps --host-root /host        # read the host's minors file from a mount
//!
//! Logs go to stderr (filtered by `RUST_LOG`, default `warn`) so stdout stays
//! machine-readable.

use anyhow::{Context, Result, bail};
use clap::Parser;
use mig_caps::{CapabilityLayout, TracingReporter, minors_override_from_env, resolve_with};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mig-caps")]
#[command(about = "Resolve MIG capability gates to /dev/nvidia-caps device nodes")]
struct Cli {
    /// Read this minors file instead of the driver's (overrides MIG_CAPS_MINORS_PATH).
    #[arg(long, conflicts_with = "host_root")]
    minors_file: Option<PathBuf>,
    /// Read the driver's minors file beneath this host-root mount.
    #[arg(long)]
    host_root: Option<PathBuf>,
    /// GPU index of the gate to look up.
    #[arg(long, requires = "gi")]
    gpu: Option<u32>,
    /// GPU instance of the gate to look up.
    #[arg(long, requires = "gpu")]
    gi: Option<u32>,
    /// Compute instance of the gate to look up.
    #[arg(long, requires = "gi")]
    ci: Option<u32>,
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let layout = layout_for(&cli);
    let map = resolve_with(&layout, &TracingReporter).with_context(|| {
        format!(
            "resolving MIG capabilities from {}",
            layout.minors_path.display()
        )
    })?;

    match (cli.gpu, cli.gi, cli.ci) {
        (Some(gpu), Some(gi), ci) => {
            let found = match ci {
                Some(ci) => map.ci_access(gpu, gi, ci),
                None => map.gi_access(gpu, gi),
            };
            match found {
                Some(device) => println!("{device}"),
                None => bail!("{}", missing_gate(&layout, gpu, gi, ci)),
            }
        }
        _ => println!(
            "{}",
            serde_json::to_string_pretty(&map).context("serializing capability map")?
        ),
    }
    Ok(())
}

fn layout_for(cli: &Cli) -> CapabilityLayout {
    if let Some(path) = &cli.minors_file {
        return CapabilityLayout::with_minors_path(path.clone());
    }
    if let Some(root) = &cli.host_root {
        return CapabilityLayout::with_host_root(root);
    }
    match minors_override_from_env() {
        Some(path) => CapabilityLayout::with_minors_path(path),
        None => CapabilityLayout::default(),
    }
}

fn missing_gate(layout: &CapabilityLayout, gpu: u32, gi: u32, ci: Option<u32>) -> String {
    let path = match ci {
        Some(ci) => layout.ci_access_path(gpu, gi, ci),
        None => layout.gi_access_path(gpu, gi),
    };
    format!("capability {path} is not available on this host")
}
