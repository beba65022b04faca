//! SHOECOUNT: live blackjack shoe tracker.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! starts the shoe session and the dashboard, then reads card events from
//! stdin until EOF or Ctrl+C.

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{info, warn};

use shoecount::config;
use shoecount::dashboard::{self, routes::DashboardState};
use shoecount::engine::{serve_feed, spawn_session, LineFeed};
use shoecount::shoe::CompositionTracker;
use shoecount::strategy::advisor::StrategyAdvisor;
use shoecount::strategy::bust::BustProbabilityEstimator;
use shoecount::strategy::edge::AdvantageCalculator;
use shoecount::strategy::kelly::KellyBetSizer;
use shoecount::strategy::ShoeAnalyzer;

const BANNER: &str = r#"
 ___  _  _  ___  ___  ___  ___  _   _  _  _  _____
/ __|| || |/ _ \| __|/ __|/ _ \| | | || \| ||_   _|
\__ \| __ | (_) | _|| (__| (_) | |_| || .` |  | |
|___/|_||_|\___/|___|\___|\___/ \___/ |_|\_|  |_|

  Shoe composition tracker and advisor, v0.1.0
  Enter cards one per line: K | frame 5,5,K | new 6 | ? 10,6 vs 10
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load_from_env()?;

    init_logging();

    println!("{BANNER}");
    info!(
        decks = cfg.shoe.decks,
        bankroll_units = %cfg.betting.bankroll_units,
        kelly_fraction = cfg.betting.kelly_fraction,
        dashboard = cfg.dashboard.enabled,
        "SHOECOUNT starting up"
    );

    // -- Initialise components -------------------------------------------

    let tracker = CompositionTracker::new(cfg.shoe.decks).context("Invalid shoe configuration")?;
    let analyzer = ShoeAnalyzer::new(
        AdvantageCalculator::new(cfg.advantage_config()),
        BustProbabilityEstimator::new(cfg.bust_config()),
        KellyBetSizer::new(cfg.kelly_config()),
        StrategyAdvisor::default(),
        cfg.betting.bankroll_units,
    );
    let (handle, session) = spawn_session(tracker, analyzer);

    if cfg.dashboard.enabled {
        let state = std::sync::Arc::new(DashboardState::new(handle.clone()));
        dashboard::spawn_dashboard(state, cfg.dashboard.port).await?;
    }

    // -- Capture loop ----------------------------------------------------

    let mut feed = LineFeed::new("stdin", BufReader::new(tokio::io::stdin()));
    let mut stdout = tokio::io::stdout();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    // with the dashboard up, end of input doesn't end the process
    serve_feed(&mut feed, &handle, &mut stdout, cfg.dashboard.enabled, shutdown)
        .await
        .context("Capture output failed")?;

    let report = handle.current();
    info!(
        cards_dealt = report.snapshot.cards_dealt,
        advantage = format!("{:+.2}%", report.advantage),
        "SHOECOUNT shut down cleanly."
    );

    drop(handle);
    if cfg.dashboard.enabled {
        // dashboard state still holds a handle; don't wait on the session
        session.abort();
    } else if let Err(e) = session.await {
        warn!(error = %e, "Session task ended abnormally");
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shoecount=info"));

    let json_logging = std::env::var("SHOECOUNT_LOG_JSON").is_ok();

    // stdout carries the capture transcript, so logs go to stderr
    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
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
