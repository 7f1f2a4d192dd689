//! Line grammar of the driver's `mig-minors` file.
//!
//! Each line names one capability gate and the minor number of the
//! `nvidia-cap<N>` device backing it:
//!
//! ```text
//! gpu0/gi1/ci2/access 10
//! gpu0/gi1/access 5
//! config 0
//! monitor 1
//! ```
//!
//! Lines are matched against [`GRAMMARS`] in order and the first full-line
//! match wins. The GI-access shape is a prefix of the CI-access shape, so CI
//! must stay ahead of GI in the table.

use super::layout::CapabilityLayout;
use serde::Serialize;

/// A minors-file line that matched one of the known shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineClassification {
    CiAccess {
        gpu: u32,
        gi: u32,
        ci: u32,
        minor: u32,
    },
    GiAccess { gpu: u32, gi: u32, minor: u32 },
    Config { minor: u32 },
    Monitor { minor: u32 },
}

impl LineClassification {
    pub fn minor(&self) -> u32 {
        match *self {
            LineClassification::CiAccess { minor, .. }
            | LineClassification::GiAccess { minor, .. }
            | LineClassification::Config { minor }
            | LineClassification::Monitor { minor } => minor,
        }
    }

    /// Virtual capability path this line gates.
    pub fn capability_path(&self, layout: &CapabilityLayout) -> String {
        match *self {
            LineClassification::CiAccess { gpu, gi, ci, .. } => {
                layout.ci_access_path(gpu, gi, ci)
            }
            LineClassification::GiAccess { gpu, gi, .. } => layout.gi_access_path(gpu, gi),
            LineClassification::Config { .. } => layout.config_path(),
            LineClassification::Monitor { .. } => layout.monitor_path(),
        }
    }

    /// Device node backing this line's gate.
    pub fn device_path(&self, layout: &CapabilityLayout) -> String {
        layout.device_path(self.minor())
    }
}

/// One entry of the ordered matcher table.
pub struct Grammar {
    name: &'static str,
    matcher: fn(&str) -> Option<LineClassification>,
}

impl Grammar {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, line: &str) -> Option<LineClassification> {
        (self.matcher)(line)
    }
}

/// Matchers in priority order.
pub const GRAMMARS: &[Grammar] = &[
    Grammar {
        name: "ci_access",
        matcher: match_ci_access,
    },
    Grammar {
        name: "gi_access",
        matcher: match_gi_access,
    },
    Grammar {
        name: "config",
        matcher: match_config,
    },
    Grammar {
        name: "monitor",
        matcher: match_monitor,
    },
];

/// Classify one line, without its trailing newline.
///
/// A single trailing `\r` is tolerated so CRLF fixtures parse the same as the
/// driver's output.
pub fn classify_line(line: &str) -> Option<LineClassification> {
    classify_line_with_grammar(line).map(|(_, classified)| classified)
}

/// Like [`classify_line`], also returning the grammar that matched.
pub fn classify_line_with_grammar(line: &str) -> Option<(&'static Grammar, LineClassification)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    GRAMMARS
        .iter()
        .find_map(|grammar| grammar.matches(line).map(|classified| (grammar, classified)))
}

fn match_ci_access(line: &str) -> Option<LineClassification> {
    let mut cursor = Cursor::new(line);
    cursor.literal("gpu")?;
    let gpu = cursor.number()?;
    cursor.literal("/gi")?;
    let gi = cursor.number()?;
    cursor.literal("/ci")?;
    let ci = cursor.number()?;
    cursor.literal("/access")?;
    let minor = cursor.minor_and_end()?;
    Some(LineClassification::CiAccess { gpu, gi, ci, minor })
}

fn match_gi_access(line: &str) -> Option<LineClassification> {
    let mut cursor = Cursor::new(line);
    cursor.literal("gpu")?;
    let gpu = cursor.number()?;
    cursor.literal("/gi")?;
    let gi = cursor.number()?;
    cursor.literal("/access")?;
    let minor = cursor.minor_and_end()?;
    Some(LineClassification::GiAccess { gpu, gi, minor })
}

fn match_config(line: &str) -> Option<LineClassification> {
    let mut cursor = Cursor::new(line);
    cursor.literal("config")?;
    let minor = cursor.minor_and_end()?;
    Some(LineClassification::Config { minor })
}

fn match_monitor(line: &str) -> Option<LineClassification> {
    let mut cursor = Cursor::new(line);
    cursor.literal("monitor")?;
    let minor = cursor.minor_and_end()?;
    Some(LineClassification::Monitor { minor })
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn literal(&mut self, expected: &str) -> Option<()> {
        self.rest = self.rest.strip_prefix(expected)?;
        Some(())
    }

    // ASCII digits only; no sign, must fit in u32.
    fn number(&mut self) -> Option<u32> {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let value = self.rest[..end].parse().ok()?;
        self.rest = &self.rest[end..];
        Some(value)
    }

    fn separator(&mut self) -> Option<()> {
        let trimmed = self.rest.trim_start_matches([' ', '\t']);
        if trimmed.len() == self.rest.len() {
            return None;
        }
        self.rest = trimmed;
        Some(())
    }

    fn minor_and_end(&mut self) -> Option<u32> {
        self.separator()?;
        let minor = self.number()?;
        self.rest.is_empty().then_some(minor)
    }
}
