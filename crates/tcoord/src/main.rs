use anyhow::{Context, Result};
use clap::Parser;
use tcoord::engine::Engine;
use tcoord_models::{MarketTick, TcoordConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tcoord",
    about = "Trading decision coordinator - collects agent signals per market tick, forms a weighted consensus, applies risk limits and writes the audit ledger"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/tcoord.toml")]
    config: String,

    /// Read MarketTick JSON lines from a file instead of stdin
    #[arg(short, long)]
    input: Option<String>,
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
    let config: TcoordConfig =
        toml::from_str(&config_str).with_context(|| "Failed to parse config")?;

    let (runner, _ledger) =
        tcoord::build_paper_runner(&config).context("Failed to build cycle runner")?;
    let engine = Engine::new(runner);
    let cancel = engine.cancel_token();

    // Handle shutdown signals
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received shutdown signal");
        cancel.cancel();
    });

    let (tick_tx, tick_rx) = mpsc::channel(64);

    // Tick feed: one MarketTick JSON object per line.
    let feed = match cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open input: {path}"))?;
            tokio::spawn(async move {
                pump_ticks(BufReader::new(file), tick_tx).await;
            })
        }
        None => tokio::spawn(async move {
            pump_ticks(BufReader::new(tokio::io::stdin()), tick_tx).await;
        }),
    };

    engine.run(tick_rx).await;
    feed.abort();

    Ok(())
}

async fn pump_ticks<R>(reader: BufReader<R>, tx: mpsc::Sender<MarketTick>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = reader.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<MarketTick>(line) {
            Ok(tick) => {
                if tx.send(tick).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Skipping unparseable tick line"),
        }
    }
}
