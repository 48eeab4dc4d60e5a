//! Summary, breakdown, and per-domain views.
//!
//! Every view sorts explicitly: buckets ascending by label, domains lexically
//! by name, severities in rank order. Filters restrict; a filter that matches
//! nothing yields an empty view, never a fallback to the unfiltered one.

use crate::aggregate::AggregateCounts;
use crate::domain::{Domain, Severity};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the per-bucket summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket: String,
    pub total: u64,
    pub errors: u64,
    pub error_rate: f64,
    /// Distinct domains touched in this bucket.
    pub domains: usize,
}

/// Non-zero severity cells for one (bucket, domain).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub bucket: String,
    pub domain: Domain,
    pub severities: Vec<SeverityCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: u64,
}

/// Per-domain totals across all buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainStats {
    pub domain: Domain,
    pub total: u64,
    pub errors: u64,
    pub error_rate: f64,
}

/// Per-bucket totals, error-class counts, and error rates.
pub fn summary(counts: &AggregateCounts) -> Vec<BucketSummary> {
    counts
        .buckets()
        .map(|(label, domains)| {
            let total = counts.bucket_total(label);
            let errors = counts.bucket_error_total(label);
            BucketSummary {
                bucket: label.to_string(),
                total,
                errors,
                error_rate: percentage(errors, total),
                domains: domains.len(),
            }
        })
        .collect()
}

/// Severity cells per (bucket, domain), optionally restricted to one bucket
/// label and/or one domain.
pub fn detailed_breakdown(
    counts: &AggregateCounts,
    bucket_filter: Option<&str>,
    domain_filter: Option<Domain>,
) -> Vec<BreakdownRow> {
    let mut rows = Vec::new();
    for (label, domains) in counts.buckets() {
        if bucket_filter.is_some_and(|wanted| wanted != label) {
            continue;
        }
        let mut entries: Vec<_> = domains.iter().collect();
        entries.sort_by_key(|(domain, _)| domain.as_str());
        for (&domain, severities) in entries {
            if domain_filter.is_some_and(|wanted| wanted != domain) {
                continue;
            }
            // Severity keys iterate in rank order; incremented cells are
            // always non-zero, so no filtering is needed here.
            let severities = severities
                .iter()
                .map(|(&severity, &count)| SeverityCount { severity, count })
                .collect();
            rows.push(BreakdownRow {
                bucket: label.to_string(),
                domain,
                severities,
            });
        }
    }
    rows
}

/// Totals and error rates per domain, aggregated across all buckets and
/// sorted lexically by domain name.
pub fn domain_statistics(counts: &AggregateCounts) -> Vec<DomainStats> {
    let mut totals: BTreeMap<Domain, (u64, u64)> = BTreeMap::new();
    for (_, domains) in counts.buckets() {
        for (&domain, severities) in domains {
            let slot = totals.entry(domain).or_default();
            for (&severity, &count) in severities {
                slot.0 += count;
                if severity.is_error_class() {
                    slot.1 += count;
                }
            }
        }
    }

    let mut stats: Vec<_> = totals
        .into_iter()
        .map(|(domain, (total, errors))| DomainStats {
            domain,
            total,
            errors,
            error_rate: percentage(errors, total),
        })
        .collect();
    stats.sort_by_key(|row| row.domain.as_str());
    stats
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
