//! stoker-link - StokerCloud poller
//!
//! Polls the boiler on an interval, or runs a single fetch / write /
//! consumption query and prints the result.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::time::{interval, MissedTickBehavior};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stoker_link::{Config, StokerClient};

#[derive(Parser)]
#[command(name = "stoker-link", version, about = "StokerCloud pellet boiler client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll on the configured interval (default)
    Poll,
    /// Fetch once and print the snapshot as JSON
    Fetch,
    /// Write a parameter by its logical key
    Write { key: String, value: f64 },
    /// Print fuel consumption history
    Consumption {
        #[arg(long, default_value_t = 12)]
        months: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stoker_link=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    let client = StokerClient::new(&config.stoker)?;

    match cli.command.unwrap_or(Command::Poll) {
        Command::Poll => poll(&client, Duration::from_secs(config.poll.interval_secs)).await,
        Command::Fetch => {
            let snapshot = client.fetch().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Write { key, value } => {
            if !client.write(&key, value).await {
                anyhow::bail!("write of {} was not confirmed", key);
            }
            println!("OK");
        }
        Command::Consumption { months } => {
            let history = client.consumption(months).await;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
    }

    Ok(())
}

/// Poll loop (runs until interrupted)
async fn poll(client: &StokerClient, every: Duration) {
    tracing::info!("[Stoker] Starting poller (interval: {}s)", every.as_secs());

    let mut timer = interval(every);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("[Stoker] Poller stopped");
                return;
            }
        }

        let snapshot = client.fetch().await;
        if snapshot.is_empty() {
            tracing::warn!("[Stoker] Poll produced no data");
            continue;
        }

        let populated = snapshot.menus.values().filter(|s| !s.is_empty()).count();
        tracing::info!(
            "[Stoker] state={} boiler_temp={:?} target_temp={:?} menus={}/{}",
            snapshot.state,
            snapshot.boiler_temp,
            snapshot.target_temp,
            populated,
            snapshot.menus.len()
        );
        match serde_json::to_string(&snapshot) {
            Ok(json) => tracing::debug!("[Stoker] Snapshot: {}", json),
            Err(e) => tracing::warn!("[Stoker] Snapshot serialization failed: {}", e),
        }
    }
}
