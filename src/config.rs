//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section and key is optional; anything omitted takes the documented
//! default, so an empty file is a valid configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::data::file::JsonFileSource;
use crate::data::fixture::FixtureSource;
use crate::data::MatchSource;
use crate::engine::scanner::ScanConfig;
use crate::simulator::{Simulator, SimulatorConfig};
use crate::strategy::value::{ValueConfig, ValueDetector};
use crate::types::{ExpectedGoals, Outcome, ValueError};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationSection,
    pub value: ValueSection,
    pub scan: ScanSection,
    pub source: SourceSection,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationSection {
    pub trials: usize,
    /// Placeholder intensities, not a calibrated estimate.
    pub home_xg: f64,
    pub away_xg: f64,
    /// Wall-clock budget per match simulation.
    pub deadline_ms: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let xg = ExpectedGoals::default();
        Self {
            trials: SimulatorConfig::default().trials,
            home_xg: xg.home,
            away_xg: xg.away,
            deadline_ms: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ValueSection {
    pub margin: f64,
    pub threshold: f64,
    pub outcomes: Vec<Outcome>,
}

impl Default for ValueSection {
    fn default() -> Self {
        let value = ValueConfig::default();
        Self {
            margin: value.margin,
            threshold: value.threshold,
            outcomes: value.outcomes,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanSection {
    pub seed: Option<u64>,
    pub parallel: bool,
    pub max_parallel: usize,
}

impl Default for ScanSection {
    fn default() -> Self {
        let scan = ScanConfig::default();
        Self {
            seed: scan.seed,
            parallel: scan.parallel,
            max_parallel: scan.max_parallel,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceSection {
    /// `"fixture"` or `"file"`.
    pub kind: String,
    /// Records generated by the fixture source.
    pub fixture_count: usize,
    /// JSON feed read by the file source.
    pub path: Option<String>,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            kind: "fixture".to_string(),
            fixture_count: 3,
            path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn expected_goals(&self) -> ExpectedGoals {
        ExpectedGoals::new(self.simulation.home_xg, self.simulation.away_xg)
    }

    pub fn simulator(&self) -> Simulator {
        Simulator::new(SimulatorConfig {
            trials: self.simulation.trials,
            deadline: self.simulation.deadline_ms.map(Duration::from_millis),
        })
    }

    pub fn value_config(&self) -> ValueConfig {
        ValueConfig {
            margin: self.value.margin,
            threshold: self.value.threshold,
            outcomes: self.value.outcomes.clone(),
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            seed: self.scan.seed,
            parallel: self.scan.parallel,
            max_parallel: self.scan.max_parallel,
        }
    }

    /// Build a validated detector from the configured parameters.
    pub fn detector(&self) -> Result<ValueDetector> {
        ValueDetector::new(self.value_config(), self.simulator(), self.expected_goals())
            .map_err(|e| {
                anyhow::Error::from(ValueError::Config(format!("invalid detector settings: {e}")))
            })
    }

    /// Build the configured match source.
    pub fn match_source(&self) -> Result<Box<dyn MatchSource>> {
        match self.source.kind.as_str() {
            "fixture" => Ok(Box::new(FixtureSource::new(self.source.fixture_count))),
            "file" => {
                let path = self.source.path.as_deref().ok_or_else(|| {
                    ValueError::Config(
                        "source.path is required when source.kind = \"file\"".to_string(),
                    )
                })?;
                Ok(Box::new(JsonFileSource::new(path)))
            }
            other => Err(ValueError::Config(format!("unknown match source kind: {other}")).into()),
        }
    }
}
