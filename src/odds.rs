//! Decimal-odds arithmetic shared by the detector and reports.
//!
//! All functions are pure. The margin adjustment is the crude uniform
//! approximation used throughout: one overround factor applied to every
//! outcome rather than a true de-margining of the full three-way book.

use std::collections::BTreeMap;

use crate::types::{Outcome, ValueError};

/// Bookmaker-implied probability of a decimal price.
///
/// Prices at or below 1.0 (or non-finite) cannot be backed for profit and
/// are rejected as `MalformedOdds`.
pub fn implied_probability(outcome: Outcome, odds: f64) -> Result<f64, ValueError> {
    if !odds.is_finite() || odds <= 1.0 {
        return Err(ValueError::MalformedOdds { outcome, odds });
    }
    Ok(1.0 / odds)
}

/// Price after removing an assumed uniform margin from an implied probability.
pub fn fair_odds(implied_prob: f64, margin: f64) -> f64 {
    1.0 / (implied_prob * margin)
}

/// Expected return per unit staked if `model_prob` is the true probability
/// and the de-margined price is the payout basis.
pub fn calculate_value(implied_prob: f64, model_prob: f64, margin: f64) -> f64 {
    model_prob * fair_odds(implied_prob, margin) - 1.0
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Actual overround of a quoted book: the sum of implied probabilities.
///
/// Returns `None` unless all three outcomes carry a valid price. Used for
/// diagnostics only; the value rule uses the configured margin.
pub fn book_overround(odds: &BTreeMap<Outcome, f64>) -> Option<f64> {
    let mut total = 0.0;
    for outcome in Outcome::ALL {
        let price = *odds.get(outcome)?;
        total += implied_probability(*outcome, price).ok()?;
    }
    Some(total)
}
