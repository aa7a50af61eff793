//! Built-in fixture source.
//!
//! Stands in for a live odds feed: returns `count` copies of a single
//! Premier League fixture with fixed three-way prices, stamped with the
//! current time. Useful for dry runs and as a deterministic test input.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::debug;

use super::{MatchBatch, MatchSource};
use crate::types::{MatchRecord, Outcome};

const HOME_TEAM: &str = "Manchester United";
const AWAY_TEAM: &str = "Liverpool";
const PRICES: [(Outcome, f64); 3] = [
    (Outcome::HomeWin, 2.10),
    (Outcome::Draw, 3.40),
    (Outcome::AwayWin, 3.20),
];

pub struct FixtureSource {
    count: usize,
}

impl FixtureSource {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Build the record for one feed id.
    fn record(match_id: usize) -> MatchRecord {
        MatchRecord {
            match_id: match_id.to_string(),
            home_team: HOME_TEAM.to_string(),
            away_team: AWAY_TEAM.to_string(),
            odds: BTreeMap::from(PRICES),
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
impl MatchSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch_matches(&self) -> Result<MatchBatch> {
        let records: Vec<_> = (1..=self.count).map(Self::record).collect();
        debug!(count = records.len(), "Fixture matches generated");
        Ok(records.into())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
