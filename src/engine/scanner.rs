//! Match scanner.
//!
//! Pulls a batch from a `MatchSource`, runs the value detector over every
//! record and produces a `ScanReport`. Each match simulates with its own
//! ChaCha stream derived from the run seed and the match's position in the
//! batch, so sequential and parallel scans of the same input agree exactly
//! and no random state is shared between workers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::data::{MatchBatch, MatchSource};
use crate::odds::book_overround;
use crate::strategy::value::{skip, ValueDetector};
use crate::strategy::BatchOutcome;
use crate::types::{MatchRecord, ValueAssessment, ValueError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Base seed for every per-match stream. Drawn from entropy when unset.
    pub seed: Option<u64>,
    /// Simulate matches on the blocking pool instead of inline.
    pub parallel: bool,
    /// Upper bound on in-flight simulations when `parallel` is set.
    pub max_parallel: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: false,
            max_parallel: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Scan report
// ---------------------------------------------------------------------------

/// Summary of a single scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub source: String,
    /// Seed that reproduces this run.
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl ScanReport {
    pub fn assessments(&self) -> &[ValueAssessment] {
        &self.outcome.assessments
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan [{}]: matches={} assessed={} skipped={} value_bets={} seed={} ({}ms)",
            self.source,
            self.outcome.matches_seen,
            self.outcome.matches_assessed(),
            self.outcome.skipped.len(),
            self.outcome.assessments.len(),
            self.seed,
            self.elapsed_ms,
        )
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

pub struct MatchScanner {
    detector: Arc<ValueDetector>,
    config: ScanConfig,
}

impl MatchScanner {
    pub fn new(detector: ValueDetector, config: ScanConfig) -> Self {
        Self {
            detector: Arc::new(detector),
            config,
        }
    }

    pub fn detector(&self) -> &ValueDetector {
        &self.detector
    }

    /// Fetch a batch from `source` and assess it.
    pub async fn scan(&self, source: &dyn MatchSource) -> Result<ScanReport> {
        let batch = source
            .fetch_matches()
            .await
            .with_context(|| format!("Failed to fetch matches from {}", source.name()))?;
        info!(
            source = source.name(),
            count = batch.records.len(),
            rejected = batch.rejected.len(),
            "Matches fetched"
        );
        self.assess_batch(source.name(), batch).await
    }

    /// Assess already-fetched records. Output keeps input order.
    pub async fn assess(&self, source: &str, records: Vec<MatchRecord>) -> Result<ScanReport> {
        self.assess_batch(source, records.into()).await
    }

    /// Assess a fetched batch. Entries the source rejected are reported as
    /// skipped ahead of the detector's own skips.
    pub async fn assess_batch(&self, source: &str, batch: MatchBatch) -> Result<ScanReport> {
        let started_at = Utc::now();
        let started = Instant::now();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let MatchBatch { records, rejected } = batch;

        let results = if self.config.parallel {
            self.run_parallel(seed, records).await?
        } else {
            self.run_sequential(seed, records).await?
        };

        let mut outcome = BatchOutcome {
            matches_seen: rejected.len() + results.len(),
            skipped: rejected,
            ..BatchOutcome::default()
        };
        for (record, result) in results {
            if let Some(overround) = book_overround(&record.odds) {
                debug!(
                    match_id = %record.match_id,
                    overround = %format!("{overround:.4}"),
                    assumed_margin = self.detector.config().margin,
                    "Book overround"
                );
            }
            match result {
                Ok(found) => outcome.assessments.extend(found),
                Err(reason) => outcome.skipped.push(skip(&record, reason)),
            }
        }

        let report = ScanReport {
            source: source.to_string(),
            seed,
            started_at,
            elapsed_ms: started.elapsed().as_millis() as u64,
            outcome,
        };

        info!(
            source = %report.source,
            matches = report.outcome.matches_seen,
            skipped = report.outcome.skipped.len(),
            value_bets = report.outcome.assessments.len(),
            seed = report.seed,
            parallel = self.config.parallel,
            elapsed_ms = report.elapsed_ms,
            "Scan complete"
        );

        Ok(report)
    }

    /// Simulate the whole batch in one blocking task, in order.
    async fn run_sequential(&self, seed: u64, records: Vec<MatchRecord>) -> Result<Vec<Assessed>> {
        let detector = Arc::clone(&self.detector);
        tokio::task::spawn_blocking(move || {
            records
                .into_iter()
                .enumerate()
                .map(|(index, record)| {
                    let result = assess_one(&detector, &record, seed, index);
                    (record, result)
                })
                .collect()
        })
        .await
        .context("Simulation task panicked")
    }

    async fn run_parallel(&self, seed: u64, records: Vec<MatchRecord>) -> Result<Vec<Assessed>> {
        let max_parallel = self.config.max_parallel.max(1);

        let tasks = records.into_iter().enumerate().map(|(index, record)| {
            let detector = Arc::clone(&self.detector);
            tokio::task::spawn_blocking(move || {
                let result = assess_one(&detector, &record, seed, index);
                (record, result)
            })
        });

        let joined: Vec<_> = stream::iter(tasks).buffered(max_parallel).collect().await;
        joined
            .into_iter()
            .map(|r| r.context("Simulation task panicked"))
            .collect()
    }
}

type Assessed = (MatchRecord, Result<Vec<ValueAssessment>, ValueError>);

/// Random stream for the match at `index` in a run seeded with `seed`.
pub fn match_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

fn assess_one(
    detector: &ValueDetector,
    record: &MatchRecord,
    seed: u64,
    index: usize,
) -> Result<Vec<ValueAssessment>, ValueError> {
    let mut rng = match_rng(seed, index);
    detector.assess_match(record, &mut rng)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
