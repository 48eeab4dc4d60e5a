#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_precision_loss,      // Acceptable for rate/percentage display
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. SourceError in source module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod aggregate;
pub mod app;
pub mod classify;
pub mod domain;
pub mod normalize;
pub mod query;
pub mod session;
pub mod source;

// Re-export main types for easy access
pub use aggregate::{AggregateCounts, Aggregator, Analysis, PassStats};
pub use app::{App, Config};
pub use classify::DomainTable;
pub use domain::{Domain, NormalizedEntry, RawRecord, Severity};
pub use session::AnalysisSession;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
