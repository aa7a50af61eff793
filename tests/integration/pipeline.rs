//! End-to-end scans over the reference feed and file-backed batches.

use valuebet::data::file::JsonFileSource;
use valuebet::data::fixture::FixtureSource;
use valuebet::engine::scanner::match_rng;
use valuebet::odds::{calculate_value, round_to};
use valuebet::simulator::Simulator;
use valuebet::strategy::value::ValueConfig;
use valuebet::types::{ExpectedGoals, Outcome, ValueError};

use crate::mock_source::{record, scanner, source_with};

#[tokio::test]
async fn test_reference_feed_scan() {
    let seed = 20_240_601;
    for parallel in [false, true] {
        let report = scanner(ValueConfig::default(), seed, parallel)
            .scan(&FixtureSource::new(3))
            .await
            .unwrap();

        assert_eq!(report.outcome.matches_seen, 3);
        assert!(report.assessments().len() <= 3);

        // Recompute every match from its own stream.
        let sim = Simulator::default();
        let mut expected = Vec::new();
        for index in 0..3 {
            let home = sim
                .simulate(ExpectedGoals::new(1.5, 1.2), &mut match_rng(seed, index))
                .unwrap()
                .home_win;
            let value = calculate_value(1.0 / 2.10, home, 1.05);
            if value > 0.1 {
                expected.push(((index + 1).to_string(), round_to(value, 2)));
            }
        }

        let actual: Vec<_> = report
            .assessments()
            .iter()
            .map(|a| {
                assert_eq!(a.outcome, Outcome::HomeWin);
                assert_eq!(a.odds, 2.10);
                (a.match_id.clone(), a.value)
            })
            .collect();
        assert_eq!(actual, expected);
    }
}

#[tokio::test]
async fn test_repeat_scan_is_identical() {
    let config = ValueConfig {
        threshold: -0.5,
        outcomes: Outcome::ALL.to_vec(),
        ..ValueConfig::default()
    };
    let first = scanner(config.clone(), 99, true)
        .scan(&FixtureSource::new(5))
        .await
        .unwrap();
    let second = scanner(config, 99, true)
        .scan(&FixtureSource::new(5))
        .await
        .unwrap();

    let values = |r: &valuebet::engine::scanner::ScanReport| -> Vec<(String, Outcome, u64)> {
        r.assessments()
            .iter()
            .map(|a| (a.match_id.clone(), a.outcome, a.value.to_bits()))
            .collect()
    };
    assert_eq!(values(&first), values(&second));
    assert!(!first.assessments().is_empty());
}

#[tokio::test]
async fn test_bad_odds_do_not_sink_batch() {
    let source = source_with(vec![
        record("1", "Arsenal", "Chelsea", [1.95, 3.60, 4.10]),
        record("2", "Leeds", "Fulham", [1.00, 3.20, 3.00]),
        record("3", "Spurs", "Everton", [2.40, 3.20, 3.00]),
    ]);
    let config = ValueConfig {
        threshold: -1.0,
        ..ValueConfig::default()
    };

    let report = scanner(config, 8, false).scan(&source).await.unwrap();

    let ids: Vec<_> = report.assessments().iter().map(|a| a.match_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(report.outcome.skipped.len(), 1);
    assert_eq!(
        report.outcome.skipped[0].reason,
        ValueError::MalformedOdds {
            outcome: Outcome::HomeWin,
            odds: 1.00
        }
    );
}

#[tokio::test]
async fn test_file_feed_with_broken_records() {
    let mut path = std::env::temp_dir();
    path.push(format!("valuebet_pipeline_{}.json", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"[
            {"match_id": 1, "home_team": "Arsenal", "away_team": "Chelsea",
             "odds": {"home_win": 1.95, "draw": 3.60, "away_win": 4.10},
             "timestamp": "2026-03-01T15:00:00Z"},
            {"match_id": 2, "home_team": "Leeds",
             "odds": {"home_win": 2.40, "draw": 3.20, "away_win": 3.00},
             "timestamp": "2026-03-01T15:00:00Z"},
            {"match_id": 3, "home_team": "Spurs", "away_team": "Everton",
             "odds": {"draw": 3.20, "away_win": 3.00},
             "timestamp": "2026-03-01T15:00:00Z"},
            {"match_id": 4, "home_team": "Wolves", "away_team": "Brentford",
             "odds": {"home_win": 2.80, "draw": 3.30, "away_win": 2.60},
             "timestamp": "2026-03-01T15:00:00Z"}
        ]"#,
    )
    .unwrap();

    let config = ValueConfig {
        threshold: -1.0,
        ..ValueConfig::default()
    };
    let report = scanner(config, 4, true)
        .scan(&JsonFileSource::new(&path))
        .await
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    // Record 2 is rejected by the source; record 3 lacks a home price.
    assert_eq!(report.outcome.matches_seen, 4);
    assert_eq!(report.outcome.matches_assessed(), 2);
    let ids: Vec<_> = report.assessments().iter().map(|a| a.match_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);

    let skipped: Vec<_> = report
        .outcome
        .skipped
        .iter()
        .map(|s| (s.match_id.as_str(), s.reason.clone()))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("2", ValueError::MissingField("away_team".to_string())),
            ("3", ValueError::MissingField("odds.home_win".to_string())),
        ]
    );
    assert!(report.to_string().contains("skipped=2"));
}

#[tokio::test]
async fn test_json_report_shape() {
    let report = scanner(ValueConfig { threshold: -1.0, ..ValueConfig::default() }, 5, false)
        .scan(&FixtureSource::new(1))
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["source"], "fixture");
    assert_eq!(json["seed"], 5);
    let bet = &json["assessments"][0];
    assert_eq!(bet["match"], "Manchester United vs Liverpool");
    assert_eq!(bet["bet_type"], "home_win");
    assert_eq!(bet["odds"], 2.10);
}
