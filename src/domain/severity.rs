use serde::{Deserialize, Serialize};
use std::fmt;

/// Journald priority level of a log entry, most severe first.
///
/// Declaration order doubles as the display rank: `Emergency` ranks 0,
/// `Debug` ranks 7, matching the journald `PRIORITY` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    /// All levels in rank order.
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    /// Maps a journald `PRIORITY` code. Anything outside `0..=7` is `Info`.
    pub fn from_priority(code: u64) -> Self {
        match code {
            0 => Severity::Emergency,
            1 => Severity::Alert,
            2 => Severity::Critical,
            3 => Severity::Error,
            4 => Severity::Warning,
            5 => Severity::Notice,
            6 => Severity::Info,
            7 => Severity::Debug,
            _ => Severity::Info,
        }
    }

    /// Parses the textual code form (`"0"`..`"7"`). Non-numeric or
    /// out-of-range codes fall back to `Info`, never an error.
    pub fn from_code(code: &str) -> Self {
        code.trim()
            .parse::<u64>()
            .map_or(Severity::Info, Self::from_priority)
    }

    /// Display rank, 0 (most severe) through 7.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Whether this level counts toward error rates
    /// (`Error`, `Critical`, `Alert`, `Emergency`).
    pub fn is_error_class(self) -> bool {
        matches!(
            self,
            Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Inverse of `as_str`, used by the search CLI's `--level` filter.
    pub fn from_name(name: &str) -> Option<Self> {
        Severity::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
