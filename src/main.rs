//! TTL KV demo driver
//!
//! Exercises the store the way an embedding application would: fills it,
//! reads from it, and drives expiration sweeps itself on a timer.

use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_kv::{drain_expired, Config, KvStorage, ManualClock, SweepReport, SystemClock};

/// Simulated seconds the manual clock moves on every sweep tick
const SIMULATED_SECS_PER_TICK: u64 = 30;

/// Entry point for the demo driver.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Run basic operations against a wall-clock store
/// 4. Run a timed sweep loop against a simulated-clock store
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_kv=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        "Configuration loaded: sweep_interval={}s, sweep_batch={}, demo_ticks={}, range_limit={}",
        config.sweep_interval, config.sweep_batch, config.demo_ticks, config.range_limit
    );

    run_basic_operations(&config)?;
    run_sweep_loop(&config).await?;

    info!("Demo complete");
    Ok(())
}

/// Fills a wall-clock store and performs one of each operation.
fn run_basic_operations(config: &Config) -> anyhow::Result<()> {
    let mut storage = KvStorage::new(
        [
            ("key1", "value1", 0),    // never expires
            ("key2", "value2", 3600), // expires in an hour
            ("key3", "value3", 60),   // expires in a minute
        ],
        SystemClock,
    );

    storage.set("new_key", "new_value", 300);

    if let Some(value) = storage.get("key1") {
        info!("Found key1 = {}", String::from_utf8_lossy(&value));
    }

    for (key, value) in storage.get_many_sorted("key", config.range_limit) {
        info!(
            "{} = {}",
            String::from_utf8_lossy(&key),
            String::from_utf8_lossy(&value)
        );
    }

    let report = drain_expired(&mut storage, config.sweep_batch);
    log_sweep("Initial sweep", &report)?;
    Ok(())
}

/// Advances a simulated clock on every tick and sweeps whatever expired.
async fn run_sweep_loop(config: &Config) -> anyhow::Result<()> {
    let clock = ManualClock::default();
    let mut storage = KvStorage::new(
        [
            ("session:alice", "token-a", 10),
            ("session:bob", "token-b", 45),
            ("session:carol", "token-c", 75),
            ("settings", "dark-mode", 0),
        ],
        clock.clone(),
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(config.sweep_interval));

    for tick in 1..=config.demo_ticks {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = signal::ctrl_c() => {
                warn!("Received Ctrl+C, stopping sweep loop");
                break;
            }
        }

        clock.advance_secs(SIMULATED_SECS_PER_TICK);
        let report = drain_expired(&mut storage, config.sweep_batch);
        log_sweep(&format!("Tick {tick}"), &report)?;
    }

    let live = storage.get_many_sorted("", config.range_limit);
    info!("{} live entries after sweeping", live.len());
    Ok(())
}

/// Logs removed keys readably and the full report as JSON.
fn log_sweep(label: &str, report: &SweepReport) -> anyhow::Result<()> {
    for entry in &report.removed {
        info!(
            "{}: removed expired {} = {}",
            label,
            String::from_utf8_lossy(&entry.key),
            String::from_utf8_lossy(&entry.value)
        );
    }
    info!("{}: {}", label, serde_json::to_string(report)?);
    Ok(())
}
