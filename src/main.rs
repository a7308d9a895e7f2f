//! covidtrack host adapter.
//!
//! Thin binary around the tracker library: loads the settings store,
//! runs the refresh loop, prints a one-line summary for the selected
//! country after each successful cycle, and flushes the cache back to
//! the store on Ctrl-C.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use covidtrack::refresh::RefreshEvent;
use covidtrack::utils::compact_number;
use covidtrack::{CacheStore, CountryRecord, Settings, StatsClient, Tracker};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_summary(records: &[CountryRecord], selected: &str) {
    match records.iter().find(|r| r.country_code == selected) {
        Some(record) => println!(
            "{}: confirmed {}  deaths {}  (as of {})",
            record.country,
            compact_number(record.confirmed as f64),
            compact_number(record.deaths as f64),
            record.timestamp,
        ),
        None => println!("No data for {}", selected),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("covidtrack starting");

    // A broken settings store is fatal: there is no cache to operate on.
    let mut settings = Settings::load().context("failed to open the settings store")?;
    let cache = CacheStore::load(settings.cache.clone());
    info!(records = cache.len(), "cache loaded");

    let client = StatsClient::new().context("failed to build HTTP client")?;
    let interval = Duration::from_secs(settings.update_frequency.max(1));

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let tracker = Tracker::new(cache, client, interval, events_tx);
    let tracker_task = tokio::spawn(tracker.run(shutdown_rx));

    let selected = settings.selected_country.clone();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events_rx.recv() => match event {
                Some(RefreshEvent::Completed(records)) => {
                    // Sentinel rows are not selectable countries.
                    let countries = records.iter().filter(|r| !r.is_aggregate()).count();
                    info!(countries, "country list updated");
                    print_summary(&records, &selected);
                }
                Some(RefreshEvent::Failed) => warn!("refresh failed; showing cached data"),
                None => break,
            }
        }
    }

    // Stop the loop; this also aborts any in-flight fetch.
    let _ = shutdown_tx.send(true);
    let cache = tracker_task.await.context("tracker task panicked")?;

    settings.cache = cache.serialize();
    settings.save().context("failed to persist settings store")?;

    info!("covidtrack shutting down");
    Ok(())
}
