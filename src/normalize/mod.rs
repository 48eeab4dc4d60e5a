//! Record normalization: one raw journald line in, one `NormalizedEntry` out.
//!
//! Failures here are per-record and non-fatal. The aggregation fold counts a
//! `SkipReason` and moves on; a malformed line never aborts a batch.

use crate::domain::{JournalFields, NormalizedEntry, RawRecord};
use chrono::{DateTime, Local};
use thiserror::Error;

/// Bucket label for records without a timestamp field.
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Why a single record was dropped from the pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("line is not a journald JSON object: {0}")]
    InvalidJson(String),
    #[error("timestamp field is not a microsecond epoch")]
    InvalidTimestamp,
    #[error("timestamp is outside the representable time range")]
    TimestampOutOfRange,
}

/// Extracts (process, severity, timestamp, bucket) from one raw record.
///
/// A missing severity or timestamp field is not an error: severity defaults
/// to `Info` and the bucket becomes `"Unknown"`. A timestamp field that is
/// present but not interpretable skips the record.
pub fn normalize(record: &RawRecord) -> Result<NormalizedEntry, SkipReason> {
    let fields = JournalFields::decode(record)
        .map_err(|err| SkipReason::InvalidJson(err.to_string()))?;

    let timestamp = match (fields.has_timestamp_field(), fields.realtime_micros()) {
        (false, _) => None,
        (true, None) => return Err(SkipReason::InvalidTimestamp),
        (true, Some(micros)) => Some(local_time(micros)?),
    };

    let bucket = match &timestamp {
        Some(ts) => month_bucket(ts),
        None => UNKNOWN_BUCKET.to_string(),
    };

    Ok(NormalizedEntry {
        process: fields.process().to_string(),
        severity: fields.severity(),
        timestamp,
        bucket,
    })
}

/// Abbreviated month name of the local-time calendar date, e.g. `"Jun"`.
pub fn month_bucket(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%b").to_string()
}

fn local_time(micros: i64) -> Result<DateTime<Local>, SkipReason> {
    let secs = micros.div_euclid(1_000_000);
    // rem_euclid keeps this in 0..999_999 even for pre-epoch values
    let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000)
        .map_err(|_| SkipReason::TimestampOutOfRange)?;
    DateTime::from_timestamp(secs, nanos)
        .map(|utc| utc.with_timezone(&Local))
        .ok_or(SkipReason::TimestampOutOfRange)
}
