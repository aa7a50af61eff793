//! Value detection.
//!
//! Compares simulated outcome probabilities to margin-adjusted bookmaker
//! prices and flags outcomes whose value coefficient clears the threshold.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{BatchOutcome, SkippedMatch};
use crate::odds::{calculate_value, fair_odds, implied_probability, round_to};
use crate::simulator::Simulator;
use crate::types::{
    ExpectedGoals, MatchRecord, Outcome, OutcomeProbabilities, ValueAssessment, ValueError,
};

/// Accepted threshold range. Values outside it are almost certainly a
/// percentage typed as a fraction or a sign error.
const THRESHOLD_RANGE: std::ops::RangeInclusive<f64> = -1.0..=10.0;

// ---------------------------------------------------------------------------
// Configuration (defaults — overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

/// Value rule parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueConfig {
    /// Assumed uniform bookmaker overround (1.05 = 5% edge across the book).
    pub margin: f64,
    /// Minimum value coefficient, exclusive.
    pub threshold: f64,
    /// Outcomes to evaluate for each match.
    pub outcomes: Vec<Outcome>,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            margin: 1.05,
            threshold: 0.1,
            outcomes: vec![Outcome::HomeWin],
        }
    }
}

impl ValueConfig {
    pub fn validate(&self) -> Result<(), ValueError> {
        if !self.margin.is_finite() || self.margin <= 0.0 {
            return Err(ValueError::InvalidParameter(format!(
                "margin must be finite and positive, got {}",
                self.margin
            )));
        }
        if !self.threshold.is_finite() || !THRESHOLD_RANGE.contains(&self.threshold) {
            return Err(ValueError::InvalidParameter(format!(
                "threshold must lie in [{}, {}], got {}",
                THRESHOLD_RANGE.start(),
                THRESHOLD_RANGE.end(),
                self.threshold
            )));
        }
        if self.outcomes.is_empty() {
            return Err(ValueError::InvalidParameter(
                "at least one outcome must be evaluated".to_string(),
            ));
        }
        Ok(())
    }
}

/// Strict threshold rule: a value exactly at the threshold is not a bet.
pub fn clears_threshold(value: f64, threshold: f64) -> bool {
    value > threshold
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Simulates each match and emits assessments for outcomes with value.
///
/// Intensities are fixed for every match; there is no per-fixture
/// calibration of expected goals.
#[derive(Debug, Clone)]
pub struct ValueDetector {
    config: ValueConfig,
    simulator: Simulator,
    xg: ExpectedGoals,
}

impl ValueDetector {
    /// Build a detector, rejecting bad parameters before any simulation.
    pub fn new(
        config: ValueConfig,
        simulator: Simulator,
        xg: ExpectedGoals,
    ) -> Result<Self, ValueError> {
        config.validate()?;
        xg.validate()?;
        if simulator.config().trials == 0 {
            return Err(ValueError::InvalidParameter(
                "trial count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            config,
            simulator,
            xg,
        })
    }

    /// Access the value configuration.
    pub fn config(&self) -> &ValueConfig {
        &self.config
    }

    pub fn expected_goals(&self) -> ExpectedGoals {
        self.xg
    }

    /// Simulate one match and assess every configured outcome.
    ///
    /// Odds are checked before the simulator runs, so a malformed record
    /// consumes no entropy.
    pub fn assess_match<R: Rng>(
        &self,
        record: &MatchRecord,
        rng: &mut R,
    ) -> Result<Vec<ValueAssessment>, ValueError> {
        self.check_odds(record)?;
        let probs = self.simulator.simulate(self.xg, rng)?;
        self.assess_with_probabilities(record, &probs)
    }

    /// Assess every configured outcome against a pre-computed distribution.
    pub fn assess_with_probabilities(
        &self,
        record: &MatchRecord,
        probs: &OutcomeProbabilities,
    ) -> Result<Vec<ValueAssessment>, ValueError> {
        let mut assessments = Vec::new();
        for &outcome in &self.config.outcomes {
            if let Some(assessment) = self.evaluate(record, outcome, probs.get(outcome))? {
                assessments.push(assessment);
            }
        }
        Ok(assessments)
    }

    /// Check a single outcome for value.
    pub fn evaluate(
        &self,
        record: &MatchRecord,
        outcome: Outcome,
        model_prob: f64,
    ) -> Result<Option<ValueAssessment>, ValueError> {
        let odds = record.odds_for(outcome)?;
        let implied = implied_probability(outcome, odds)?;
        let value = calculate_value(implied, model_prob, self.config.margin);

        if !clears_threshold(value, self.config.threshold) {
            debug!(
                match_id = %record.match_id,
                outcome = %outcome,
                odds,
                model_prob = %format!("{:.1}%", model_prob * 100.0),
                value = %format!("{value:.3}"),
                "Value below threshold"
            );
            return Ok(None);
        }

        let fair = fair_odds(implied, self.config.margin);
        debug!(
            match_id = %record.match_id,
            outcome = %outcome,
            odds,
            fair_odds = %format!("{fair:.2}"),
            model_prob = %format!("{:.1}%", model_prob * 100.0),
            value = %format!("{value:.3}"),
            "Value detected"
        );

        Ok(Some(ValueAssessment {
            match_id: record.match_id.clone(),
            match_description: record.description(),
            outcome,
            value: round_to(value, 2),
            odds,
            model_probability: model_prob,
            fair_odds: fair,
        }))
    }

    /// Assess an ordered batch, drawing from one random source in order.
    ///
    /// A record that fails is logged and skipped; the rest of the batch is
    /// still assessed. Output keeps input order.
    pub fn find_value_bets<R: Rng>(&self, records: &[MatchRecord], rng: &mut R) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            matches_seen: records.len(),
            ..BatchOutcome::default()
        };

        for record in records {
            match self.assess_match(record, rng) {
                Ok(found) => outcome.assessments.extend(found),
                Err(reason) => outcome.skipped.push(skip(record, reason)),
            }
        }

        info!(
            matches_in = outcome.matches_seen,
            skipped = outcome.skipped.len(),
            value_bets = outcome.assessments.len(),
            "Value detection complete"
        );

        outcome
    }

    fn check_odds(&self, record: &MatchRecord) -> Result<(), ValueError> {
        for &outcome in &self.config.outcomes {
            implied_probability(outcome, record.odds_for(outcome)?)?;
        }
        Ok(())
    }
}

/// Log and record a match that could not be assessed.
pub(crate) fn skip(record: &MatchRecord, reason: ValueError) -> SkippedMatch {
    warn!(
        match_id = %record.match_id,
        fixture = %record,
        error = %reason,
        "Skipping match"
    );
    SkippedMatch {
        match_id: record.match_id.clone(),
        description: record.description(),
        reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
