//! Keyword and recent-error scans over the raw record batch.
//!
//! Both scans walk the batch linearly with a scan cap and a match cap; they
//! never consult the aggregate structure. Records that fail to decode are
//! passed over silently, same as in the aggregation fold.

use crate::domain::{JournalFields, RawRecord, Severity};
use serde::Serialize;

/// Records inspected at most by `recent_errors`.
pub const ERROR_SCAN_LIMIT: usize = 500;
/// Matches returned by `recent_errors` unless the caller asks for fewer.
pub const DEFAULT_ERROR_LIMIT: usize = 20;

const MESSAGE_PREVIEW_CHARS: usize = 80;

/// Caps and filters for the keyword scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Exact severity to keep; `None` keeps every level.
    pub level: Option<Severity>,
    /// Records inspected at most.
    pub scan_limit: usize,
    /// Matches returned at most.
    pub match_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            level: None,
            scan_limit: 100,
            match_limit: 10,
        }
    }
}

/// One matched record, with the message truncated for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub process: String,
    pub severity: Severity,
    pub message: String,
}

/// Case-insensitive substring scan over `MESSAGE`.
pub fn search(records: &[RawRecord], keyword: &str, options: &SearchOptions) -> Vec<SearchHit> {
    let needle = keyword.to_lowercase();
    let mut hits = Vec::new();
    for record in records.iter().take(options.scan_limit) {
        let Ok(fields) = JournalFields::decode(record) else {
            continue;
        };
        let Some(message) = fields.message() else {
            continue;
        };
        if !message.to_lowercase().contains(&needle) {
            continue;
        }
        let severity = fields.severity();
        if options.level.is_some_and(|wanted| wanted != severity) {
            continue;
        }
        hits.push(SearchHit {
            process: fields.process().to_string(),
            severity,
            message: preview(message),
        });
        if hits.len() == options.match_limit {
            break;
        }
    }
    hits
}

/// First error-class records in the batch, up to `limit` of them.
pub fn recent_errors(records: &[RawRecord], limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for record in records.iter().take(ERROR_SCAN_LIMIT) {
        let Ok(fields) = JournalFields::decode(record) else {
            continue;
        };
        let severity = fields.severity();
        if !severity.is_error_class() {
            continue;
        }
        hits.push(SearchHit {
            process: fields.process().to_string(),
            severity,
            message: preview(fields.message().unwrap_or("")),
        });
        if hits.len() == limit {
            break;
        }
    }
    hits
}

fn preview(message: &str) -> String {
    message.chars().take(MESSAGE_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(process: &str, priority: &str, message: &str) -> RawRecord {
        RawRecord::new(format!(
            r#"{{"SYSLOG_IDENTIFIER":"{process}","PRIORITY":"{priority}","MESSAGE":"{message}"}}"#
        ))
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let records = vec![
            record("sshd", "6", "Accepted publickey for root"),
            record("kernel", "3", "I/O error on device sda"),
        ];
        let hits = search(&records, "ERROR", &SearchOptions::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].process, "kernel");
        assert_eq!(hits[0].severity, Severity::Error);
    }

    #[test]
    fn level_filter_is_exact() {
        let records = vec![
            record("kernel", "3", "usb reset"),
            record("kernel", "4", "usb reset"),
        ];
        let options = SearchOptions {
            level: Some(Severity::Warning),
            ..SearchOptions::default()
        };
        let hits = search(&records, "usb", &options);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].severity, Severity::Warning);
    }

    #[test]
    fn caps_bound_the_scan_and_the_matches() {
        let records: Vec<_> = (0..200).map(|i| record("app", "6", &format!("tick {i}"))).collect();

        let capped = search(&records, "tick", &SearchOptions::default());
        assert_eq!(capped.len(), 10);

        // Matches beyond the scan window are never seen
        let options = SearchOptions {
            scan_limit: 5,
            match_limit: 100,
            ..SearchOptions::default()
        };
        assert_eq!(search(&records, "tick", &options).len(), 5);
    }

    #[test]
    fn long_messages_are_truncated_for_display() {
        let long = "x".repeat(200);
        let records = vec![record("app", "6", &long)];
        let hits = search(&records, "x", &SearchOptions::default());
        assert_eq!(hits[0].message.chars().count(), 80);
    }

    #[test]
    fn undecodable_records_are_passed_over() {
        let records = vec![
            RawRecord::new("-- reboot --"),
            record("kernel", "2", "panic imminent"),
        ];
        let hits = search(&records, "panic", &SearchOptions::default());
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn recent_errors_keeps_error_class_only() {
        let records = vec![
            record("kernel", "3", "bad sector"),
            record("sshd", "6", "session opened"),
            record("abrtd", "2", "crash detected"),
            record("cupsd", "0", "printer on fire"),
        ];
        let hits = recent_errors(&records, DEFAULT_ERROR_LIMIT);
        let processes: Vec<_> = hits.iter().map(|hit| hit.process.as_str()).collect();
        assert_eq!(processes, vec!["kernel", "abrtd", "cupsd"]);
    }

    #[test]
    fn recent_errors_respects_the_limit() {
        let records: Vec<_> = (0..30).map(|i| record("app", "3", &format!("fail {i}"))).collect();
        assert_eq!(recent_errors(&records, 7).len(), 7);
    }
}
