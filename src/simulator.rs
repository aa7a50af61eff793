//! Monte Carlo outcome simulator.
//!
//! Draws independent Poisson goal counts for each side and classifies every
//! paired draw as a home win, draw or away win. Home and away goals are
//! treated as independent, which ignores the score correlation seen in real
//! matches; this is a known limitation of the model.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use crate::types::{ExpectedGoals, OutcomeProbabilities, ValueError};

/// Largest intensity sampled in one Knuth pass. `exp(-30)` is still well
/// inside f64 range; larger intensities are split and summed.
const POISSON_CHUNK: f64 = 30.0;

/// The deadline is polled once per this many trials.
const DEADLINE_CHECK_INTERVAL: usize = 1024;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Simulator configuration.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Number of simulated matches per estimate.
    pub trials: usize,
    /// Optional wall-clock budget per estimate.
    pub deadline: Option<Duration>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            deadline: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Poisson goal-scoring simulator.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Convenience constructor for a fixed trial count and no deadline.
    pub fn with_trials(trials: usize) -> Self {
        Self::new(SimulatorConfig {
            trials,
            ..SimulatorConfig::default()
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Estimate the three-way result probabilities for one fixture.
    ///
    /// Inputs are validated before any entropy is consumed. The away-win
    /// probability is the complement of the other two.
    pub fn simulate<R: Rng>(
        &self,
        xg: ExpectedGoals,
        rng: &mut R,
    ) -> Result<OutcomeProbabilities, ValueError> {
        xg.validate()?;
        let trials = self.config.trials;
        if trials == 0 {
            return Err(ValueError::InvalidParameter(
                "trial count must be at least 1".to_string(),
            ));
        }

        let started = Instant::now();
        let mut home_wins = 0usize;
        let mut draws = 0usize;

        for trial in 0..trials {
            if let Some(budget) = self.config.deadline {
                if trial > 0 && trial % DEADLINE_CHECK_INTERVAL == 0 && started.elapsed() > budget {
                    return Err(ValueError::DeadlineExceeded {
                        completed: trial,
                        budget_ms: budget.as_millis() as u64,
                    });
                }
            }

            let home_goals = sample_poisson(xg.home, rng);
            let away_goals = sample_poisson(xg.away, rng);
            match home_goals.cmp(&away_goals) {
                std::cmp::Ordering::Greater => home_wins += 1,
                std::cmp::Ordering::Equal => draws += 1,
                std::cmp::Ordering::Less => {}
            }
        }

        let n = trials as f64;
        let probs = OutcomeProbabilities::from_home_and_draw(home_wins as f64 / n, draws as f64 / n);

        debug!(
            home_xg = xg.home,
            away_xg = xg.away,
            trials,
            elapsed_us = started.elapsed().as_micros() as u64,
            probs = %probs,
            "Simulation complete"
        );

        Ok(probs)
    }
}

/// Draw one Poisson variate with mean `lambda` (must be finite, >= 0 and
/// small enough that subtracting a chunk changes it; `ExpectedGoals`
/// caps intensities at `MAX_EXPECTED_GOALS`).
///
/// Knuth's multiplication method, applied per chunk of at most
/// `POISSON_CHUNK` so `exp(-lambda)` never underflows; the sum of independent
/// Poisson draws is Poisson with the summed mean.
pub fn sample_poisson<R: Rng>(lambda: f64, rng: &mut R) -> u64 {
    let mut remaining = lambda;
    let mut total = 0u64;
    while remaining > 0.0 {
        let chunk = remaining.min(POISSON_CHUNK);
        remaining -= chunk;
        total += knuth_poisson(chunk, rng);
    }
    total
}

fn knuth_poisson<R: Rng>(lambda: f64, rng: &mut R) -> u64 {
    let limit = (-lambda).exp();
    let mut k = 0u64;
    let mut p: f64 = rng.gen();
    while p > limit {
        k += 1;
        p *= rng.gen::<f64>();
    }
    k
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
