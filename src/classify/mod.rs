//! Domain classification.
//!
//! A `DomainTable` maps process names to subsystem domains via an exact-match
//! reverse index, with a `systemd*` prefix fallback for unit names the table
//! does not enumerate. The table is built once at startup (built-in
//! membership, optionally extended from a TOML file) and is read-only
//! afterwards.

use crate::domain::Domain;
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Built-in membership, in domain declaration order.
const BUILTIN: [(Domain, &[&str]); 9] = [
    (Domain::Kernel, &["kernel"]),
    (
        Domain::Boot,
        &[
            "systemd",
            "dracut",
            "dracut-cmdline",
            "systemd-modules-load",
            "systemd-fsck",
        ],
    ),
    (
        Domain::Network,
        &[
            "NetworkManager",
            "wpa_supplicant",
            "ModemManager",
            "avahi-daemon",
            "chronyd",
        ],
    ),
    (Domain::Audio, &["pipewire", "wireplumber", "alsactl"]),
    (
        Domain::Security,
        &["auditd", "audit", "polkitd", "setroubleshoot", "sudo"],
    ),
    (
        Domain::PackageMgmt,
        &["dnf", "dnf5", "dnf5daemon-server", "PackageKit", "fwupd"],
    ),
    (
        Domain::CrashHandling,
        &[
            "abrt-server",
            "abrtd",
            "abrt-dump-journal-core",
            "systemd-coredump",
        ],
    ),
    (Domain::Schedulers, &["crond", "CROND", "atd", "anacron"]),
    (
        Domain::Desktop,
        &[
            "xfce4-terminal",
            "dolphin",
            "vlc",
            "chrome",
            "brave-browser-stable",
        ],
    ),
];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("unknown domain name '{0}' in domain table")]
    UnknownDomain(String),
    #[error("failed to read domain table file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("failed to parse domain table TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// On-disk extension format: `[domains]` maps a domain name to extra
/// process names, e.g. `NETWORK = ["tailscaled"]`.
#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    domains: BTreeMap<String, Vec<String>>,
}

/// Immutable process-name to domain lookup table.
///
/// Claims are registered in declaration order and the first domain to claim
/// a process name keeps it; a duplicate claim is a configuration mistake and
/// is logged, not an error. Domain sets are expected to be disjoint.
#[derive(Debug, Clone)]
pub struct DomainTable {
    index: HashMap<String, Domain>,
}

impl Default for DomainTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DomainTable {
    /// Table with only the built-in membership.
    pub fn builtin() -> Self {
        let mut table = Self {
            index: HashMap::new(),
        };
        for (domain, processes) in BUILTIN {
            for process in processes {
                table.claim(process, domain);
            }
        }
        table
    }

    /// Built-in table extended with the entries of a TOML document.
    ///
    /// Extension only adds process names; built-in claims keep precedence
    /// under the first-wins rule.
    pub fn from_toml_str(raw: &str) -> Result<Self, TableError> {
        let file: TableFile = toml::from_str(raw)?;
        let mut table = Self::builtin();
        for (name, processes) in &file.domains {
            let domain = Domain::from_name(name)
                .ok_or_else(|| TableError::UnknownDomain(name.clone()))?;
            for process in processes {
                table.claim(process, domain);
            }
        }
        tracing::info!(entries = table.len(), "Loaded custom domain table");
        Ok(table)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, TableError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Classifies a process name into a domain.
    ///
    /// Empty names and the `"unknown"` sentinel short-circuit to `Misc`;
    /// otherwise an exact index hit wins, then the `systemd` prefix rule,
    /// then `Misc`. Total and deterministic for every input.
    pub fn classify(&self, process: &str) -> Domain {
        if process.is_empty() || process == "unknown" {
            return Domain::Misc;
        }
        if let Some(domain) = self.index.get(process) {
            return *domain;
        }
        if process.starts_with("systemd") {
            return Domain::Boot;
        }
        Domain::Misc
    }

    /// Number of exact-match entries in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn claim(&mut self, process: &str, domain: Domain) {
        match self.index.entry(process.to_string()) {
            Entry::Occupied(existing) => {
                let owner = *existing.get();
                if owner != domain {
                    tracing::warn!(
                        process = process,
                        kept = %owner,
                        ignored = %domain,
                        "Process claimed by two domains; keeping first owner"
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(domain);
            }
        }
    }
}
