//! Mock match source for integration testing.
//!
//! Provides a `mockall` implementation of `MatchSource` so tests control
//! exactly which records a scan sees, plus helpers for building records.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;

use valuebet::data::{MatchBatch, MatchSource};
use valuebet::engine::scanner::{MatchScanner, ScanConfig};
use valuebet::simulator::Simulator;
use valuebet::strategy::value::{ValueConfig, ValueDetector};
use valuebet::types::{ExpectedGoals, MatchRecord, Outcome, ValueError};

mockall::mock! {
    pub Source {}

    #[async_trait]
    impl MatchSource for Source {
        fn name(&self) -> &'static str;
        async fn fetch_matches(&self) -> anyhow::Result<MatchBatch>;
    }
}

/// A record with explicit three-way prices.
pub fn record(id: &str, home: &str, away: &str, prices: [f64; 3]) -> MatchRecord {
    MatchRecord {
        match_id: id.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        odds: BTreeMap::from([
            (Outcome::HomeWin, prices[0]),
            (Outcome::Draw, prices[1]),
            (Outcome::AwayWin, prices[2]),
        ]),
        timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap(),
    }
}

/// Mock source that returns `records` once.
pub fn source_with(records: Vec<MatchRecord>) -> MockSource {
    let mut source = MockSource::new();
    source.expect_name().return_const("mock");
    source
        .expect_fetch_matches()
        .times(1)
        .returning(move || Ok(records.clone().into()));
    source
}

pub fn scanner(config: ValueConfig, seed: u64, parallel: bool) -> MatchScanner {
    let detector =
        ValueDetector::new(config, Simulator::default(), ExpectedGoals::default()).unwrap();
    MatchScanner::new(
        detector,
        ScanConfig {
            seed: Some(seed),
            parallel,
            max_parallel: 4,
        },
    )
}

#[tokio::test]
async fn test_mock_source_feeds_scanner() {
    let source = source_with(vec![
        record("a", "Arsenal", "Chelsea", [1.95, 3.60, 4.10]),
        record("b", "Leeds", "Fulham", [2.40, 3.20, 3.00]),
    ]);
    let report = scanner(ValueConfig { threshold: -1.0, ..ValueConfig::default() }, 3, false)
        .scan(&source)
        .await
        .unwrap();

    assert_eq!(report.source, "mock");
    let fixtures: Vec<_> = report
        .assessments()
        .iter()
        .map(|a| a.match_description.as_str())
        .collect();
    assert_eq!(fixtures, vec!["Arsenal vs Chelsea", "Leeds vs Fulham"]);
}

#[tokio::test]
async fn test_source_failure_is_reported() {
    let mut source = MockSource::new();
    source.expect_name().return_const("mock");
    source
        .expect_fetch_matches()
        .times(1)
        .returning(|| {
            Err(ValueError::DataSource {
                source_name: "mock".to_string(),
                message: "feed offline".to_string(),
            }
            .into())
        });

    let err = scanner(ValueConfig::default(), 1, false)
        .scan(&source)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to fetch matches from mock"));
    assert!(format!("{err:#}").contains("feed offline"));
}

#[tokio::test]
async fn test_empty_batch() {
    let source = source_with(Vec::new());
    let report = scanner(ValueConfig::default(), 1, true).scan(&source).await.unwrap();
    assert_eq!(report.outcome.matches_seen, 0);
    assert!(report.assessments().is_empty());
    assert!(report.outcome.skipped.is_empty());
}
