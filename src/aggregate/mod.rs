//! The aggregation engine: folds raw journald records into the
//! bucket -> domain -> severity count structure.
//!
//! The fold is commutative and associative, so the parallel mode can shard
//! the input with rayon and merge partial counts by pointwise addition; for
//! a fixed input the result is identical regardless of processing order.

use crate::classify::DomainTable;
use crate::domain::{Domain, RawRecord, Severity};
use crate::normalize::normalize;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Operator-feedback cadence for the sequential fold.
const PROGRESS_INTERVAL: u64 = 5000;

pub type SeverityCounts = BTreeMap<Severity, u64>;
pub type DomainCounts = BTreeMap<Domain, SeverityCounts>;

/// Nested counts keyed by time bucket, then domain, then severity.
///
/// Increment-only during a pass. `BTreeMap` keys keep every iteration in
/// lexicographic bucket order and declaration domain/severity order, so no
/// consumer depends on insertion order. Reads never create keys; the full
/// key path is materialized on increment instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateCounts {
    buckets: BTreeMap<String, DomainCounts>,
}

impl AggregateCounts {
    pub fn increment(&mut self, bucket: &str, domain: Domain, severity: Severity) {
        let slot = self
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .entry(domain)
            .or_default()
            .entry(severity)
            .or_insert(0);
        *slot += 1;
    }

    /// Count for one (bucket, domain, severity) cell; absent keys read as 0.
    pub fn count(&self, bucket: &str, domain: Domain, severity: Severity) -> u64 {
        self.buckets
            .get(bucket)
            .and_then(|domains| domains.get(&domain))
            .and_then(|severities| severities.get(&severity))
            .copied()
            .unwrap_or(0)
    }

    pub fn bucket(&self, bucket: &str) -> Option<&DomainCounts> {
        self.buckets.get(bucket)
    }

    /// Buckets in ascending label order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &DomainCounts)> {
        self.buckets
            .iter()
            .map(|(label, domains)| (label.as_str(), domains))
    }

    pub fn bucket_total(&self, bucket: &str) -> u64 {
        self.buckets.get(bucket).map_or(0, |domains| {
            domains.values().flat_map(BTreeMap::values).sum()
        })
    }

    /// Sum over the error-class severities in one bucket.
    pub fn bucket_error_total(&self, bucket: &str) -> u64 {
        self.buckets.get(bucket).map_or(0, |domains| {
            domains
                .values()
                .flat_map(BTreeMap::iter)
                .filter(|(severity, _)| severity.is_error_class())
                .map(|(_, count)| count)
                .sum()
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Pointwise addition of another count structure into this one.
    pub fn merge(&mut self, other: AggregateCounts) {
        for (bucket, domains) in other.buckets {
            let bucket_slot = self.buckets.entry(bucket).or_default();
            for (domain, severities) in domains {
                let domain_slot = bucket_slot.entry(domain).or_default();
                for (severity, count) in severities {
                    *domain_slot.entry(severity).or_insert(0) += count;
                }
            }
        }
    }
}

/// Scan diagnostics for one pass. Operator-visible only, never part of the
/// count data model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PassStats {
    pub total: u64,
    pub processed: u64,
    pub skipped: u64,
}

impl PassStats {
    pub fn merge(&mut self, other: PassStats) {
        self.total += other.total;
        self.processed += other.processed;
        self.skipped += other.skipped;
    }
}

/// Result of one aggregation pass over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub counts: AggregateCounts,
    pub stats: PassStats,
}

impl Analysis {
    /// Consuming merge, shaped for rayon's reduce step.
    pub fn merged(mut self, other: Analysis) -> Self {
        self.counts.merge(other.counts);
        self.stats.merge(other.stats);
        self
    }
}

/// Runs aggregation passes against a fixed domain table.
#[derive(Debug, Clone)]
pub struct Aggregator {
    table: DomainTable,
    parallel: bool,
}

impl Aggregator {
    pub fn new(table: DomainTable) -> Self {
        Self {
            table,
            parallel: false,
        }
    }

    /// Enables the rayon shard-and-merge fold for large batches.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn table(&self) -> &DomainTable {
        &self.table
    }

    /// Folds a batch into fresh counts. An empty batch is a valid input and
    /// yields an empty structure.
    pub fn aggregate(&self, records: &[RawRecord]) -> Analysis {
        let analysis = if self.parallel {
            self.fold_parallel(records)
        } else {
            self.fold_sequential(records)
        };
        tracing::info!(
            total = analysis.stats.total,
            processed = analysis.stats.processed,
            skipped = analysis.stats.skipped,
            buckets = analysis.counts.bucket_count(),
            "Aggregation pass complete"
        );
        analysis
    }

    fn fold_sequential(&self, records: &[RawRecord]) -> Analysis {
        let mut analysis = Analysis::default();
        for record in records {
            self.fold_one(record, &mut analysis);
            if analysis.stats.total % PROGRESS_INTERVAL == 0 {
                tracing::info!(scanned = analysis.stats.total, "Aggregation progress");
            }
        }
        analysis
    }

    fn fold_parallel(&self, records: &[RawRecord]) -> Analysis {
        records
            .par_iter()
            .fold(Analysis::default, |mut acc, record| {
                self.fold_one(record, &mut acc);
                acc
            })
            .reduce(Analysis::default, Analysis::merged)
    }

    fn fold_one(&self, record: &RawRecord, analysis: &mut Analysis) {
        analysis.stats.total += 1;
        match normalize(record) {
            Ok(entry) => {
                let domain = self.table.classify(&entry.process);
                analysis
                    .counts
                    .increment(&entry.bucket, domain, entry.severity);
                analysis.stats.processed += 1;
            }
            Err(reason) => {
                analysis.stats.skipped += 1;
                tracing::debug!(%reason, "Skipping record");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_read_as_zero() {
        let counts = AggregateCounts::default();
        assert_eq!(counts.count("Jun", Domain::Kernel, Severity::Error), 0);
        assert_eq!(counts.bucket_total("Jun"), 0);
        assert_eq!(counts.bucket_error_total("Jun"), 0);
        assert!(counts.is_empty());
    }

    #[test]
    fn increment_materializes_the_key_path() {
        let mut counts = AggregateCounts::default();
        counts.increment("Jun", Domain::Kernel, Severity::Error);
        counts.increment("Jun", Domain::Kernel, Severity::Error);
        counts.increment("Jun", Domain::Misc, Severity::Info);

        assert_eq!(counts.count("Jun", Domain::Kernel, Severity::Error), 2);
        assert_eq!(counts.count("Jun", Domain::Misc, Severity::Info), 1);
        assert_eq!(counts.bucket_total("Jun"), 3);
        assert_eq!(counts.bucket_error_total("Jun"), 2);
        assert_eq!(counts.bucket_count(), 1);
    }

    #[test]
    fn merge_is_pointwise_addition() {
        let mut left = AggregateCounts::default();
        left.increment("Jun", Domain::Kernel, Severity::Error);
        left.increment("Jul", Domain::Misc, Severity::Info);

        let mut right = AggregateCounts::default();
        right.increment("Jun", Domain::Kernel, Severity::Error);
        right.increment("Jun", Domain::Boot, Severity::Notice);

        left.merge(right);
        assert_eq!(left.count("Jun", Domain::Kernel, Severity::Error), 2);
        assert_eq!(left.count("Jun", Domain::Boot, Severity::Notice), 1);
        assert_eq!(left.count("Jul", Domain::Misc, Severity::Info), 1);
    }

    #[test]
    fn buckets_iterate_in_label_order() {
        let mut counts = AggregateCounts::default();
        counts.increment("Unknown", Domain::Misc, Severity::Info);
        counts.increment("Apr", Domain::Misc, Severity::Info);
        counts.increment("Jun", Domain::Misc, Severity::Info);

        let labels: Vec<_> = counts.buckets().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["Apr", "Jun", "Unknown"]);
    }

    #[test]
    fn stats_track_skips_separately() {
        let aggregator = Aggregator::new(DomainTable::builtin());
        let records = vec![
            RawRecord::new(r#"{"SYSLOG_IDENTIFIER":"kernel","PRIORITY":"3"}"#),
            RawRecord::new("not json"),
            RawRecord::new(r#"{"SYSLOG_IDENTIFIER":"sshd","PRIORITY":"6"}"#),
        ];
        let analysis = aggregator.aggregate(&records);
        assert_eq!(analysis.stats.total, 3);
        assert_eq!(analysis.stats.processed, 2);
        assert_eq!(analysis.stats.skipped, 1);
    }

    #[test]
    fn parallel_fold_matches_sequential() {
        let records: Vec<_> = (0..257)
            .map(|i| {
                RawRecord::new(format!(
                    r#"{{"SYSLOG_IDENTIFIER":"proc-{}","PRIORITY":"{}"}}"#,
                    i % 7,
                    i % 10
                ))
            })
            .collect();

        let sequential = Aggregator::new(DomainTable::builtin()).aggregate(&records);
        let parallel = Aggregator::new(DomainTable::builtin())
            .with_parallel(true)
            .aggregate(&records);
        assert_eq!(sequential, parallel);
    }

    mod prop {
        use super::*;
        use proptest::prelude::prop;
        use proptest::prelude::*;

        /// Journald-ish lines plus the occasional unparseable one.
        fn line_strategy() -> impl Strategy<Value = String> {
            let well_formed = (
                prop::sample::select(vec!["kernel", "systemd", "sshd", "dnf", "unknown", ""]),
                0u64..12,
                prop::option::of(prop::sample::select(vec![
                    1_718_452_800_000_000i64,
                    1_721_044_800_000_000,
                    1_735_700_000_000_000,
                ])),
            )
                .prop_map(|(process, priority, ts)| match ts {
                    Some(ts) => format!(
                        r#"{{"SYSLOG_IDENTIFIER":"{process}","PRIORITY":"{priority}","__REALTIME_TIMESTAMP":"{ts}"}}"#
                    ),
                    None => {
                        format!(r#"{{"SYSLOG_IDENTIFIER":"{process}","PRIORITY":"{priority}"}}"#)
                    }
                });
            prop_oneof![
                4 => well_formed,
                1 => Just("-- no entries --".to_string()),
            ]
        }

        proptest! {
            #[test]
            fn fold_is_commutative(
                lines in proptest::collection::vec(line_strategy(), 0..40),
                seed in any::<u64>(),
            ) {
                let records: Vec<RawRecord> =
                    lines.iter().map(|line| RawRecord::new(line.clone())).collect();

                // Deterministic Fisher-Yates permutation driven by the seed
                let mut shuffled = records.clone();
                let mut state = seed | 1;
                for i in (1..shuffled.len()).rev() {
                    state = state
                        .wrapping_mul(6_364_136_223_846_793_005)
                        .wrapping_add(1_442_695_040_888_963_407);
                    let j = usize::try_from(state % (i as u64 + 1)).unwrap();
                    shuffled.swap(i, j);
                }

                let aggregator = Aggregator::new(DomainTable::builtin());
                prop_assert_eq!(
                    aggregator.aggregate(&records).counts,
                    aggregator.aggregate(&shuffled).counts
                );
            }

            #[test]
            fn shard_merge_equals_direct_fold(
                lines in proptest::collection::vec(line_strategy(), 0..40),
                split in 0usize..40,
            ) {
                let records: Vec<RawRecord> =
                    lines.iter().map(|line| RawRecord::new(line.clone())).collect();
                let split = split.min(records.len());
                let aggregator = Aggregator::new(DomainTable::builtin());

                let direct = aggregator.aggregate(&records);
                let left = aggregator.aggregate(&records[..split]);
                let right = aggregator.aggregate(&records[split..]);

                prop_assert_eq!(direct, left.merged(right));
            }
        }
    }
}
