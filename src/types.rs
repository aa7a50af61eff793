//! Shared types for the VALUEBET detector.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the simulator, strategy,
//! data and engine modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// One of the three mutually exclusive full-time results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    /// All outcomes in book order (useful for iteration).
    pub const ALL: &'static [Outcome] = &[Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin];

    /// The wire label used by feeds and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::HomeWin => "home_win",
            Outcome::Draw => "draw",
            Outcome::AwayWin => "away_win",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse an outcome label (case-insensitive).
impl std::str::FromStr for Outcome {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home_win" => Ok(Outcome::HomeWin),
            "draw" => Ok(Outcome::Draw),
            "away_win" => Ok(Outcome::AwayWin),
            other => Err(ValueError::InvalidParameter(format!(
                "unknown outcome label: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Match record
// ---------------------------------------------------------------------------

/// A fixture with bookmaker decimal odds, as produced by a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    /// Decimal odds per outcome. Not every feed quotes all three.
    pub odds: BTreeMap<Outcome, f64>,
    /// When the odds were captured.
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.home_team, self.away_team)
    }
}

impl MatchRecord {
    /// Human-readable fixture description, e.g. `"Arsenal vs Chelsea"`.
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// Quoted odds for an outcome, or `MissingField` if the feed omitted it.
    pub fn odds_for(&self, outcome: Outcome) -> Result<f64, ValueError> {
        self.odds
            .get(&outcome)
            .copied()
            .ok_or_else(|| ValueError::MissingField(format!("odds.{}", outcome.label())))
    }

    /// Decode a record from an untyped feed object.
    ///
    /// Every absent key is reported as `MissingField`. Feeds commonly send a
    /// numeric `match_id`; it is kept as its string form. Odds labels that
    /// are not one of the three outcomes are ignored.
    pub fn from_value(value: &Value) -> Result<Self, ValueError> {
        let obj = value.as_object().ok_or_else(|| {
            ValueError::MissingField("record is not a JSON object".to_string())
        })?;

        let match_id = match required(obj, "match_id")? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let home_team = string_field(required(obj, "home_team")?, "home_team")?;
        let away_team = string_field(required(obj, "away_team")?, "away_team")?;

        let raw_odds = required(obj, "odds")?
            .as_object()
            .ok_or_else(|| ValueError::MissingField("odds".to_string()))?;
        let mut odds = BTreeMap::new();
        for (label, price) in raw_odds {
            let Ok(outcome) = label.parse::<Outcome>() else {
                continue;
            };
            let price = price.as_f64().ok_or(ValueError::MalformedOdds {
                outcome,
                odds: f64::NAN,
            })?;
            odds.insert(outcome, price);
        }

        let timestamp = match required(obj, "timestamp")? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| ValueError::MissingField(format!("timestamp ({e})")))?,
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or_else(|| ValueError::MissingField("timestamp".to_string()))?,
            _ => return Err(ValueError::MissingField("timestamp".to_string())),
        };

        Ok(Self {
            match_id,
            home_team,
            away_team,
            odds,
            timestamp,
        })
    }

    /// Helper to build a test/sample record with the reference feed prices.
    #[cfg(test)]
    pub fn sample(match_id: &str) -> Self {
        MatchRecord {
            match_id: match_id.to_string(),
            home_team: "Manchester United".to_string(),
            away_team: "Liverpool".to_string(),
            odds: BTreeMap::from([
                (Outcome::HomeWin, 2.10),
                (Outcome::Draw, 3.40),
                (Outcome::AwayWin, 3.20),
            ]),
            timestamp: Utc::now(),
        }
    }
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ValueError> {
    obj.get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ValueError::MissingField(key.to_string()))
}

fn string_field(value: &Value, key: &str) -> Result<String, ValueError> {
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| ValueError::MissingField(key.to_string()))
}

// ---------------------------------------------------------------------------
// Model inputs and outputs
// ---------------------------------------------------------------------------

/// Highest accepted scoring intensity. Far beyond any football score; it
/// bounds the per-trial cost of Poisson sampling.
pub const MAX_EXPECTED_GOALS: f64 = 100.0;

/// Poisson scoring intensities for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

impl Default for ExpectedGoals {
    /// Placeholder intensities, not a calibrated estimate.
    fn default() -> Self {
        Self {
            home: 1.5,
            away: 1.2,
        }
    }
}

impl ExpectedGoals {
    pub fn new(home: f64, away: f64) -> Self {
        Self { home, away }
    }

    /// Reject negative, non-finite or implausibly large intensities.
    pub fn validate(&self) -> Result<(), ValueError> {
        for (side, xg) in [("home", self.home), ("away", self.away)] {
            if !xg.is_finite() || !(0.0..=MAX_EXPECTED_GOALS).contains(&xg) {
                return Err(ValueError::InvalidParameter(format!(
                    "{side} expected goals must lie in [0, {MAX_EXPECTED_GOALS}], got {xg}"
                )));
            }
        }
        Ok(())
    }
}

/// Model probabilities for the three-way result.
///
/// `away_win` is always derived as the complement of the other two so the
/// triple sums to one regardless of sampling noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

impl OutcomeProbabilities {
    /// Build from the home-win and draw probabilities.
    pub fn from_home_and_draw(home_win: f64, draw: f64) -> Self {
        Self {
            home_win,
            draw,
            away_win: 1.0 - home_win - draw,
        }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::HomeWin => self.home_win,
            Outcome::Draw => self.draw,
            Outcome::AwayWin => self.away_win,
        }
    }

    pub fn total(&self) -> f64 {
        self.home_win + self.draw + self.away_win
    }
}

impl fmt::Display for OutcomeProbabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "H {:.1}% | D {:.1}% | A {:.1}%",
            self.home_win * 100.0,
            self.draw * 100.0,
            self.away_win * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Value assessment
// ---------------------------------------------------------------------------

/// A recommended outcome whose value coefficient cleared the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAssessment {
    pub match_id: String,
    /// `"{home_team} vs {away_team}"`
    #[serde(rename = "match")]
    pub match_description: String,
    #[serde(rename = "bet_type")]
    pub outcome: Outcome,
    /// Value coefficient rounded to two decimals.
    pub value: f64,
    /// Quoted decimal odds the value was computed against.
    pub odds: f64,
    pub model_probability: f64,
    pub fair_odds: f64,
}

impl fmt::Display for ValueAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | bet: {} | odds: {} | value: {}",
            self.match_description, self.outcome, self.odds, self.value,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for VALUEBET.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Malformed odds for {outcome}: {odds} (must be a finite decimal price > 1.0)")]
    MalformedOdds { outcome: Outcome, odds: f64 },

    #[error("Simulation deadline of {budget_ms}ms exceeded after {completed} trials")]
    DeadlineExceeded { completed: usize, budget_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data source error ({source_name}): {message}")]
    DataSource { source_name: String, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
