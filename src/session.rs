//! Analysis session lifecycle: load a batch, run a pass, query the result.
//!
//! The session is what keeps "never analyzed" and "analyzed but empty"
//! distinguishable: aggregate queries fail with `NotAnalyzed` until a pass
//! has run, while an analyzed empty batch answers them with empty views.

use crate::aggregate::{Aggregator, Analysis, PassStats};
use crate::domain::{Domain, RawRecord};
use crate::query::{
    self, AnomalyReport, BreakdownRow, BucketSummary, DomainStats, SearchHit, SearchOptions,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// A query arrived before any aggregation pass ran.
    #[error("no analysis available yet; run an aggregation pass first")]
    NotAnalyzed,
}

/// Owns the raw batch and the frozen result of the latest pass.
///
/// Loading a new batch drops the previous analysis, so queries can never
/// observe counts from a batch that is no longer loaded.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    records: Vec<RawRecord>,
    analysis: Option<Analysis>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fresh batch and invalidates any prior analysis.
    pub fn load(&mut self, records: Vec<RawRecord>) {
        self.records = records;
        self.analysis = None;
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Runs an aggregation pass over the loaded batch and freezes the result.
    pub fn analyze(&mut self, aggregator: &Aggregator) -> &Analysis {
        let analysis = aggregator.aggregate(&self.records);
        self.analysis.insert(analysis)
    }

    pub fn analysis(&self) -> Result<&Analysis, SessionError> {
        self.analysis.as_ref().ok_or(SessionError::NotAnalyzed)
    }

    pub fn stats(&self) -> Result<PassStats, SessionError> {
        Ok(self.analysis()?.stats)
    }

    pub fn summary(&self) -> Result<Vec<BucketSummary>, SessionError> {
        Ok(query::summary(&self.analysis()?.counts))
    }

    pub fn detailed_breakdown(
        &self,
        bucket: Option<&str>,
        domain: Option<Domain>,
    ) -> Result<Vec<BreakdownRow>, SessionError> {
        Ok(query::detailed_breakdown(
            &self.analysis()?.counts,
            bucket,
            domain,
        ))
    }

    pub fn domain_statistics(&self) -> Result<Vec<DomainStats>, SessionError> {
        Ok(query::domain_statistics(&self.analysis()?.counts))
    }

    pub fn detect_anomalies(&self) -> Result<AnomalyReport, SessionError> {
        Ok(query::detect_anomalies(&self.analysis()?.counts))
    }

    /// Raw-scan read path; reads the loaded batch, no analysis required.
    pub fn search(&self, keyword: &str, options: &SearchOptions) -> Vec<SearchHit> {
        query::search(&self.records, keyword, options)
    }

    /// Raw-scan read path; reads the loaded batch, no analysis required.
    pub fn recent_errors(&self, limit: usize) -> Vec<SearchHit> {
        query::recent_errors(&self.records, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::DomainTable;

    fn aggregator() -> Aggregator {
        Aggregator::new(DomainTable::builtin())
    }

    #[test]
    fn queries_before_analyze_are_rejected() {
        let mut session = AnalysisSession::new();
        session.load(vec![RawRecord::new(r#"{"PRIORITY":"3"}"#)]);

        assert_eq!(session.summary().unwrap_err(), SessionError::NotAnalyzed);
        assert_eq!(
            session.detect_anomalies().unwrap_err(),
            SessionError::NotAnalyzed
        );
    }

    #[test]
    fn empty_batch_analyzes_to_empty_views() {
        let mut session = AnalysisSession::new();
        session.load(Vec::new());
        session.analyze(&aggregator());

        assert!(session.summary().unwrap().is_empty());
        assert_eq!(session.stats().unwrap(), PassStats::default());
    }

    #[test]
    fn loading_a_new_batch_invalidates_the_analysis() {
        let mut session = AnalysisSession::new();
        session.load(vec![RawRecord::new(r#"{"SYSLOG_IDENTIFIER":"kernel"}"#)]);
        session.analyze(&aggregator());
        assert!(session.summary().is_ok());

        session.load(Vec::new());
        assert_eq!(session.summary().unwrap_err(), SessionError::NotAnalyzed);
    }

    #[test]
    fn search_needs_no_analysis() {
        let mut session = AnalysisSession::new();
        session.load(vec![RawRecord::new(
            r#"{"SYSLOG_IDENTIFIER":"sshd","PRIORITY":"6","MESSAGE":"Accepted publickey"}"#,
        )]);

        let hits = session.search("publickey", &SearchOptions::default());
        assert_eq!(hits.len(), 1);
    }
}
