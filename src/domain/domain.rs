use serde::{Deserialize, Serialize};
use std::fmt;

/// Subsystem category a log-emitting process is classified into.
///
/// Declaration order is the tie-break order when the classifier builds its
/// reverse process index: the first domain to claim a process name keeps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Domain {
    Kernel,
    Boot,
    Network,
    Audio,
    Security,
    PackageMgmt,
    CrashHandling,
    Schedulers,
    Desktop,
    Misc,
}

impl Domain {
    /// All domains in declaration order.
    pub const ALL: [Domain; 10] = [
        Domain::Kernel,
        Domain::Boot,
        Domain::Network,
        Domain::Audio,
        Domain::Security,
        Domain::PackageMgmt,
        Domain::CrashHandling,
        Domain::Schedulers,
        Domain::Desktop,
        Domain::Misc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Kernel => "KERNEL",
            Domain::Boot => "BOOT",
            Domain::Network => "NETWORK",
            Domain::Audio => "AUDIO",
            Domain::Security => "SECURITY",
            Domain::PackageMgmt => "PACKAGE_MGMT",
            Domain::CrashHandling => "CRASH_HANDLING",
            Domain::Schedulers => "SCHEDULERS",
            Domain::Desktop => "DESKTOP",
            Domain::Misc => "MISC",
        }
    }

    /// Inverse of `as_str`, used when loading a custom domain table.
    pub fn from_name(name: &str) -> Option<Self> {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
