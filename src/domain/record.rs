use super::severity::Severity;
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::Value;

/// One raw journald line exactly as the log source produced it.
///
/// Held undecoded so the aggregation and search paths can each decode on
/// their own terms; a line that fails to decode is skipped by whichever
/// path touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    line: String,
}

impl RawRecord {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }
}

/// Decoded view over the journald fields the engine consumes.
///
/// journalctl emits `PRIORITY` and `__REALTIME_TIMESTAMP` as JSON strings,
/// but other producers emit plain numbers; both encodings are accepted.
/// `MESSAGE` may be a byte array for non-UTF-8 payloads, so it is kept as a
/// raw value and only surfaced when it is an ordinary string.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalFields {
    #[serde(rename = "SYSLOG_IDENTIFIER")]
    syslog_identifier: Option<String>,
    #[serde(rename = "_COMM")]
    comm: Option<String>,
    #[serde(rename = "PRIORITY")]
    priority: Option<Value>,
    #[serde(rename = "__REALTIME_TIMESTAMP")]
    realtime_timestamp: Option<Value>,
    #[serde(rename = "MESSAGE")]
    message: Option<Value>,
}

impl JournalFields {
    pub fn decode(record: &RawRecord) -> Result<Self, serde_json::Error> {
        serde_json::from_str(record.as_str())
    }

    /// Process identifier: `SYSLOG_IDENTIFIER` unless empty or the
    /// `"unknown"` sentinel, then `_COMM`, then `"unknown"`.
    pub fn process(&self) -> &str {
        let primary = self.syslog_identifier.as_deref().unwrap_or("");
        if !primary.is_empty() && primary != "unknown" {
            return primary;
        }
        let fallback = self.comm.as_deref().unwrap_or("");
        if fallback.is_empty() { "unknown" } else { fallback }
    }

    /// Severity from `PRIORITY`. Missing or unrecognized codes are `Info`.
    pub fn severity(&self) -> Severity {
        match &self.priority {
            Some(Value::String(code)) => Severity::from_code(code),
            Some(Value::Number(code)) => {
                code.as_u64().map_or(Severity::Info, Severity::from_priority)
            }
            _ => Severity::Info,
        }
    }

    /// Whether the record carries a `__REALTIME_TIMESTAMP` field at all.
    pub fn has_timestamp_field(&self) -> bool {
        self.realtime_timestamp.is_some()
    }

    /// Microsecond epoch from `__REALTIME_TIMESTAMP`, when the field holds
    /// an integral value. `None` when absent or not interpretable.
    pub fn realtime_micros(&self) -> Option<i64> {
        match self.realtime_timestamp.as_ref()? {
            Value::String(raw) => raw.trim().parse().ok(),
            Value::Number(raw) => raw.as_i64(),
            _ => None,
        }
    }

    /// `MESSAGE` when it is a plain string; byte-array payloads yield `None`.
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().and_then(Value::as_str)
    }
}

/// The engine's working shape for one record: everything the classifier and
/// the aggregation fold need, nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntry {
    /// Non-empty; `"unknown"` when absent from both source fields.
    pub process: String,
    pub severity: Severity,
    /// Absent when the source record had no timestamp field.
    pub timestamp: Option<DateTime<Local>>,
    /// Abbreviated month name, or `"Unknown"` when `timestamp` is absent.
    pub bucket: String,
}
