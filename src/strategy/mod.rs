//! Strategy engine — margin-adjusted value detection over match batches.

pub mod value;

use serde::{Serialize, Serializer};

use crate::types::{ValueAssessment, ValueError};

// ---------------------------------------------------------------------------
// Decision log
// ---------------------------------------------------------------------------

/// A record that could not be assessed, and why.
///
/// Kept for transparency: a skipped match never aborts the batch, but the
/// caller can see every record that was passed over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedMatch {
    pub match_id: String,
    pub description: String,
    #[serde(serialize_with = "serialize_display")]
    pub reason: ValueError,
}

/// Result of running the detector over an ordered batch of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// Assessments in input order (no ranking by value).
    pub assessments: Vec<ValueAssessment>,
    pub skipped: Vec<SkippedMatch>,
    pub matches_seen: usize,
}

impl BatchOutcome {
    /// Number of records that were fully evaluated.
    pub fn matches_assessed(&self) -> usize {
        self.matches_seen - self.skipped.len()
    }
}

fn serialize_display<S: Serializer>(value: &ValueError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
