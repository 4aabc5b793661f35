//! Script-visible diagnostic severities

use serde::{Deserialize, Serialize};

/// Severity of a message sent through the diagnostic channel.
///
/// `Fatal` is engine-level: the native side is expected to terminate after
/// receiving it. Nothing on the scripting side recovers from it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Verbose,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
