//! Reads the minors file and builds the capability-to-device mapping.

use super::grammar::classify_line_with_grammar;
use super::layout::CapabilityLayout;
use super::CapabilityMap;
use crate::error::{MigError, Result};
use crate::report::{LineReporter, TracingReporter};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

/// Resolve MIG capability device paths from the driver's minors file.
///
/// Skipped lines are logged through `tracing`.
pub fn resolve() -> Result<CapabilityMap> {
    resolve_with(&CapabilityLayout::default(), &TracingReporter)
}

/// Resolve using `layout.minors_path` as the source.
pub fn resolve_with(
    layout: &CapabilityLayout,
    reporter: &dyn LineReporter,
) -> Result<CapabilityMap> {
    resolve_from_path(&layout.minors_path, layout, reporter)
}

/// Resolve from an explicit minors file.
///
/// A missing file means the host has no MIG capability subsystem and yields
/// an empty map. Any other open failure, or an I/O failure while reading, is
/// returned as an error. The file is closed before this returns.
pub fn resolve_from_path(
    path: &Path,
    layout: &CapabilityLayout,
    reporter: &dyn LineReporter,
) -> Result<CapabilityMap> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "MIG minors file absent; no MIG capabilities");
            return Ok(CapabilityMap::empty(layout.clone()));
        }
        Err(source) => {
            return Err(MigError::Open {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let map = resolve_from_reader(BufReader::new(file), layout, reporter).map_err(|source| {
        MigError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(path = %path.display(), entries = map.len(), "Resolved MIG capability device paths");
    Ok(map)
}

/// Resolve from any line source.
///
/// Lines are classified independently in a single forward pass. Lines that
/// match no grammar, including non-UTF-8 ones, go to `reporter` and are
/// skipped. When two lines name the same capability the later one wins.
pub fn resolve_from_reader<R: BufRead>(
    mut reader: R,
    layout: &CapabilityLayout,
    reporter: &dyn LineReporter,
) -> io::Result<CapabilityMap> {
    let mut entries = BTreeMap::new();
    let mut buf = Vec::new();
    let mut line_number = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf);
        match std::str::from_utf8(raw).ok().and_then(classify_line_with_grammar) {
            Some((grammar, line)) => {
                trace!(
                    line_number,
                    grammar = grammar.name(),
                    minor = line.minor(),
                    "Classified MIG minors line"
                );
                entries.insert(line.capability_path(layout), line.device_path(layout));
            }
            None => reporter.skipped_line(line_number, &String::from_utf8_lossy(raw)),
        }
    }

    Ok(CapabilityMap::new(layout.clone(), entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use std::io::{Cursor, Read};

    fn resolve_str(input: &str, reporter: &RecordingReporter) -> CapabilityMap {
        resolve_from_reader(
            Cursor::new(input.as_bytes().to_vec()),
            &CapabilityLayout::default(),
            reporter,
        )
        .expect("in-memory read")
    }

    #[test]
    fn empty_source_yields_empty_map() {
        let reporter = RecordingReporter::new();
        let map = resolve_str("", &reporter);
        assert!(map.is_empty());
        assert!(reporter.skipped().is_empty());
    }

    #[test]
    fn reports_line_numbers_of_skipped_lines() {
        let reporter = RecordingReporter::new();
        let map = resolve_str("config 0\n\nbogus\nmonitor 1\n", &reporter);
        assert_eq!(map.len(), 2);
        let skipped = reporter.skipped();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].line_number, 2);
        assert_eq!(skipped[0].raw, "");
        assert_eq!(skipped[1].line_number, 3);
        assert_eq!(skipped[1].raw, "bogus");
    }

    #[test]
    fn final_line_without_newline_is_classified() {
        let reporter = RecordingReporter::new();
        let map = resolve_str("config 0\nmonitor 4", &reporter);
        assert_eq!(map.monitor(), Some("/dev/nvidia-caps/nvidia-cap4"));
        assert!(reporter.skipped().is_empty());
    }

    #[test]
    fn later_duplicate_wins() {
        let reporter = RecordingReporter::new();
        let map = resolve_str("gpu0/gi1/access 5\ngpu0/gi1/access 6\n", &reporter);
        assert_eq!(map.len(), 1);
        assert_eq!(map.gi_access(0, 1), Some("/dev/nvidia-caps/nvidia-cap6"));
    }

    #[test]
    fn non_utf8_line_is_skipped_lossily() {
        let reporter = RecordingReporter::new();
        let mut input = b"config 1\n".to_vec();
        input.extend_from_slice(b"gpu0/gi\xff/access 2\n");
        input.extend_from_slice(b"monitor 2\n");
        let map = resolve_from_reader(
            Cursor::new(input),
            &CapabilityLayout::default(),
            &reporter,
        )
        .expect("in-memory read");
        assert_eq!(map.len(), 2);
        assert_eq!(reporter.raw_lines(), vec!["gpu0/gi\u{fffd}/access 2".to_string()]);
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("device went away"));
            }
            self.served = true;
            let chunk = b"config 0\n";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn read_failure_is_an_error() {
        let reporter = RecordingReporter::new();
        let err = resolve_from_reader(
            BufReader::new(FailingReader { served: false }),
            &CapabilityLayout::default(),
            &reporter,
        )
        .expect_err("read failure surfaces");
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
