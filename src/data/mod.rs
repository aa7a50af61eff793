//! Match data sources.
//!
//! Defines the `MatchSource` trait and provides the implementations used
//! by the binary. Acquisition (HTTP feeds, scraping) lives entirely behind
//! this trait; the detector never depends on a specific mechanism.

pub mod file;
pub mod fixture;

use anyhow::Result;
use async_trait::async_trait;

use crate::strategy::SkippedMatch;
use crate::types::MatchRecord;

/// One fetch worth of feed data.
///
/// `rejected` holds feed entries the source could not turn into a
/// `MatchRecord`; they are reported alongside the detector's own skips.
#[derive(Debug, Clone, Default)]
pub struct MatchBatch {
    pub records: Vec<MatchRecord>,
    pub rejected: Vec<SkippedMatch>,
}

impl MatchBatch {
    /// Total feed entries, decoded or not.
    pub fn len(&self) -> usize {
        self.records.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<MatchRecord>> for MatchBatch {
    fn from(records: Vec<MatchRecord>) -> Self {
        Self {
            records,
            rejected: Vec::new(),
        }
    }
}

/// Abstraction over external odds feeds.
///
/// Implementations return records in feed order. Entries they cannot
/// decode go into `MatchBatch::rejected` rather than disappearing.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Fetch the current batch of match records.
    async fn fetch_matches(&self) -> Result<MatchBatch>;
}
