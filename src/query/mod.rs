//! Read-only views over a frozen `AggregateCounts` snapshot, plus the
//! bounded raw-scan search path that deliberately bypasses the aggregate
//! structure.

pub mod anomaly;
pub mod search;
pub mod views;

pub use anomaly::{
    AnomalyAnalysis, AnomalyFinding, AnomalyReport, MIN_QUALIFYING_BUCKETS, Verdict,
    detect_anomalies,
};
pub use search::{
    DEFAULT_ERROR_LIMIT, ERROR_SCAN_LIMIT, SearchHit, SearchOptions, recent_errors, search,
};
pub use views::{
    BreakdownRow, BucketSummary, DomainStats, SeverityCount, detailed_breakdown,
    domain_statistics, summary,
};
