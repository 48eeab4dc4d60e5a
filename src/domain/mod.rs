//! Domain layer for journal-triage.
//!
//! Contains the canonical types shared across all modules:
//! - `RawRecord` / `JournalFields`: one journald line, undecoded and decoded
//! - `NormalizedEntry`: the engine's per-record working shape
//! - `Severity`: the 8 journald priority levels
//! - `Domain`: the subsystem categories records are classified into

pub mod domain;
pub mod record;
pub mod severity;

pub use domain::Domain;
pub use record::{JournalFields, NormalizedEntry, RawRecord};
pub use severity::Severity;
