//! VALUEBET — Monte Carlo value-bet detector
//!
//! Entry point. Loads configuration, initialises structured logging,
//! runs one scan over the configured match source and prints every value
//! bet found, as text lines or (with `--json`) as a JSON report.

use anyhow::Result;
use tracing::info;

use valuebet::config::AppConfig;
use valuebet::engine::scanner::{MatchScanner, ScanReport};

const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("VALUEBET_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;
    let json_output = std::env::args().skip(1).any(|arg| arg == "--json");

    info!(
        config = %config_path,
        trials = cfg.simulation.trials,
        home_xg = cfg.simulation.home_xg,
        away_xg = cfg.simulation.away_xg,
        margin = cfg.value.margin,
        threshold = cfg.value.threshold,
        source = %cfg.source.kind,
        "VALUEBET starting up"
    );

    let source = cfg.match_source()?;
    let scanner = MatchScanner::new(cfg.detector()?, cfg.scan_config());
    let report = scanner.scan(source.as_ref()).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Human-readable output: one line per value bet.
fn print_report(report: &ScanReport) {
    println!("Value bets found:");
    for assessment in report.assessments() {
        println!("{assessment}");
    }
    for skipped in &report.outcome.skipped {
        println!("skipped {} ({}): {}", skipped.match_id, skipped.description, skipped.reason);
    }
    println!("{report}");
}

/// Initialise the `tracing` subscriber.
///
/// Logs go to stderr so stdout carries only the report.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("valuebet=info"));

    let json_logging = std::env::var("VALUEBET_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
