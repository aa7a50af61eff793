//! JSON file source.
//!
//! Reads a JSON array of match objects from disk. Each element is decoded
//! on its own, so one malformed record is rejected with a warning instead of
//! failing the whole file. Rejected elements are identified by their
//! `match_id` when present, otherwise by `#<index>`.
//!
//! Expected element shape:
//!
//! ```json
//! {
//!   "match_id": 1,
//!   "home_team": "Arsenal",
//!   "away_team": "Chelsea",
//!   "odds": { "home_win": 1.95, "draw": 3.60, "away_win": 4.10 },
//!   "timestamp": "2026-03-01T15:00:00Z"
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{MatchBatch, MatchSource};
use crate::strategy::SkippedMatch;
use crate::types::{MatchRecord, ValueError};

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Decode every element of a feed array, rejecting the ones that fail.
    fn decode_records(raw: &str) -> Result<MatchBatch> {
        let value: Value = serde_json::from_str(raw).context("Feed is not valid JSON")?;
        let items = value.as_array().ok_or_else(|| {
            anyhow!(ValueError::DataSource {
                source_name: "file".to_string(),
                message: "top-level value must be an array of matches".to_string(),
            })
        })?;

        let mut batch = MatchBatch::default();
        for (index, item) in items.iter().enumerate() {
            match MatchRecord::from_value(item) {
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    warn!(index, error = %e, "Rejecting undecodable match record");
                    batch.rejected.push(rejected_element(index, item, e));
                }
            }
        }
        Ok(batch)
    }
}

fn rejected_element(index: usize, item: &Value, reason: ValueError) -> SkippedMatch {
    let match_id = match item.get("match_id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("#{index}"),
    };
    let team = |key: &str| item.get(key).and_then(Value::as_str).unwrap_or("?").to_string();
    SkippedMatch {
        match_id,
        description: format!("{} vs {}", team("home_team"), team("away_team")),
        reason,
    }
}

#[async_trait]
impl MatchSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_matches(&self) -> Result<MatchBatch> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read match file: {}", self.path.display()))?;
        let batch = Self::decode_records(&raw)
            .with_context(|| format!("Failed to parse match file: {}", self.path.display()))?;

        debug!(
            path = %self.path.display(),
            count = batch.records.len(),
            rejected = batch.rejected.len(),
            "Matches loaded from file"
        );
        Ok(batch)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
