use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tcoord_adapt::config::AdaptConfig;
use tcoord_adapt::daemon::AdaptDaemon;
use tcoord_ledger::SqliteLedger;
use tcoord_models::{AdapterPromotion, OutcomeEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tcoord-adapt",
    about = "Weight adaptation daemon - attributes realized outcomes to the decision ledger and updates agent trust weights"
)]
struct Cli {
    /// Path to adaptation configuration file
    #[arg(short, long, default_value = "config/tcoord-adapt.toml")]
    config: String,

    /// Replay unapplied attributions and exit without consuming the feed
    #[arg(long)]
    replay_only: bool,
}

/// One line of the stdin event feed. Outcome events and promotion
/// announcements share the feed and are told apart by shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedEvent {
    Outcome(OutcomeEvent),
    Promotion(AdapterPromotion),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config: {}", cli.config))?;
    let config: AdaptConfig =
        toml::from_str(&config_str).with_context(|| "Failed to parse adapt config")?;

    let store = SqliteLedger::open(&config.sqlite_path, config.weights.clone())
        .with_context(|| format!("Failed to open ledger DB: {}", config.sqlite_path))?;
    let mut daemon = AdaptDaemon::new(store, config.weights.clone());

    if cli.replay_only {
        let applied = daemon
            .apply_pending()
            .map_err(|e| anyhow::anyhow!("Replay failed: {e}"))?;
        tracing::info!(applied, "Replay complete");
        return Ok(());
    }

    let (outcome_tx, outcome_rx) = mpsc::channel(config.channel_capacity);
    let (promotion_tx, promotion_rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();

    // Feed reader: JSON lines on stdin. Dropping the senders on EOF lets
    // the daemon drain and stop on its own.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<FeedEvent>(line) {
                Ok(FeedEvent::Outcome(event)) => {
                    if outcome_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(FeedEvent::Promotion(promotion)) => {
                    if promotion_tx.send(promotion).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "Skipping unparseable feed line"),
            }
        }
    });

    // Handle shutdown signals
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received shutdown signal");
        signal_cancel.cancel();
    });

    daemon
        .run(outcome_rx, promotion_rx, cancel)
        .await
        .map_err(|e| anyhow::anyhow!("Daemon error: {e}"))?;

    Ok(())
}
