//! The refresh cycle: fetch current statistics, reconcile them into the
//! cache store, signal the presentation layer, repeat on an interval.
//!
//! Cycles are strictly sequential. The [`Tracker::run`] loop awaits one
//! fetch, then one sleep, so at most one trigger is ever pending and
//! cycles never overlap. A failed fetch suppresses the update for that
//! cycle only; stale data is preferred over no data.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::api::{CountryEntry, StatsSnapshot, StatsSource, WorldStats};
use crate::cache::CacheStore;
use crate::models::{CountryRecord, DIAMOND_PRINCESS_CODE, DIAMOND_PRINCESS_NAME, WORLD_CODE};

/// Timestamp format shared by every row updated in one cycle.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Signal emitted after each cycle so a presentation layer can redraw.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// The cycle succeeded; carries the updated record set.
    Completed(Vec<CountryRecord>),
    /// The cycle failed; the cache was left untouched.
    Failed,
}

/// Periodic fetch-and-merge driver over a [`CacheStore`].
pub struct Tracker<S> {
    cache: CacheStore,
    source: S,
    interval: Duration,
    events: mpsc::UnboundedSender<RefreshEvent>,
}

impl<S: StatsSource> Tracker<S> {
    pub fn new(
        cache: CacheStore,
        source: S,
        interval: Duration,
        events: mpsc::UnboundedSender<RefreshEvent>,
    ) -> Self {
        Self {
            cache,
            source,
            interval,
            events,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Run one cycle: fetch, merge on success, emit exactly one signal.
    pub async fn refresh_once(&mut self) {
        debug!("refreshing statistics");

        match self.source.fetch_stats().await {
            Ok(snapshot) => {
                let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
                self.apply_snapshot(snapshot, &timestamp);
                info!(records = self.cache.len(), "refresh completed");
                let _ = self
                    .events
                    .send(RefreshEvent::Completed(self.cache.records().to_vec()));
            }
            Err(e) => {
                warn!(error = %e, "refresh failed; keeping cached data");
                let _ = self.events.send(RefreshEvent::Failed);
            }
        }
    }

    /// Merge a successful snapshot into the cache. Entries with no
    /// resolvable country code cannot be keyed and are skipped.
    fn apply_snapshot(&mut self, snapshot: StatsSnapshot, timestamp: &str) {
        for entry in &snapshot.data {
            let Some(code) = resolve_country_code(entry) else {
                debug!(
                    country = entry.country.as_deref().unwrap_or(""),
                    "skipping entry with no resolvable country code"
                );
                continue;
            };
            self.cache.upsert(build_record(entry, code, timestamp));
        }

        self.cache
            .upsert(build_world_record(&snapshot.world_stats, timestamp));
    }

    /// Refresh immediately, then once per interval until shutdown.
    ///
    /// Flipping the shutdown channel aborts an in-flight fetch by dropping
    /// its future; the cache is only ever mutated after a fetch completes,
    /// so the returned store is always in a valid, serializable state.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> CacheStore {
        loop {
            tokio::select! {
                _ = self.refresh_once() => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.cache
    }
}

/// Determine the key for an upstream entry: the explicit top-level code,
/// then the 2-letter code, then the 3-letter code, skipping empty strings.
/// The Diamond Princess is reported by name with no usable code and is
/// forced to its sentinel regardless of what the source claims.
fn resolve_country_code(entry: &CountryEntry) -> Option<String> {
    if entry.country.as_deref() == Some(DIAMOND_PRINCESS_NAME) {
        return Some(DIAMOND_PRINCESS_CODE.to_string());
    }

    [
        entry.country_code.as_deref(),
        entry.country_info.iso2.as_deref(),
        entry.country_info.iso3.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|code| !code.is_empty())
    .map(str::to_string)
}

/// Normalize an upstream count to the cache sentinel. The source does not
/// distinguish a reported zero from a missing field; both collapse to -1.
/// Known precision loss, preserved for compatibility with rows persisted
/// by earlier versions.
fn stat(value: Option<i64>) -> i64 {
    match value {
        Some(v) if v != 0 => v,
        _ => -1,
    }
}

/// Decimal counterpart of [`stat`], for the per-million columns.
fn stat_decimal(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v != 0.0 => v,
        _ => -1.0,
    }
}

fn build_record(entry: &CountryEntry, country_code: String, timestamp: &str) -> CountryRecord {
    CountryRecord {
        country_code,
        country: entry.country.clone().unwrap_or_default(),
        cases: stat(entry.cases),
        deaths: stat(entry.deaths),
        recovered: stat(entry.recovered),
        active: stat(entry.active),
        critical: stat(entry.critical),
        confirmed: stat(entry.confirmed),
        timestamp: timestamp.to_string(),
        today_cases: stat(entry.today_cases),
        today_deaths: stat(entry.today_deaths),
        cases_per_one_million: stat_decimal(entry.cases_per_one_million),
        deaths_per_one_million: stat_decimal(entry.deaths_per_one_million),
        flag_url: entry.country_info.flag.clone().unwrap_or_default(),
    }
}

/// World totals are copied as reported: zeros stay zeros and only a
/// genuinely absent field becomes -1, unlike country rows. The aggregate
/// row carries no flag.
fn build_world_record(world: &WorldStats, timestamp: &str) -> CountryRecord {
    CountryRecord {
        country_code: WORLD_CODE.to_string(),
        country: world.country.clone().unwrap_or_else(|| "World".to_string()),
        cases: world.cases.unwrap_or(-1),
        deaths: world.deaths.unwrap_or(-1),
        recovered: world.recovered.unwrap_or(-1),
        active: world.active.unwrap_or(-1),
        critical: world.critical.unwrap_or(-1),
        confirmed: world.confirmed.unwrap_or(-1),
        timestamp: timestamp.to_string(),
        today_cases: world.today_cases.unwrap_or(-1),
        today_deaths: world.today_deaths.unwrap_or(-1),
        cases_per_one_million: world.cases_per_one_million.unwrap_or(-1.0),
        deaths_per_one_million: world.deaths_per_one_million.unwrap_or(-1.0),
        flag_url: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::api::{ApiError, CountryInfo};

    fn entry(country: &str, code: Option<&str>) -> CountryEntry {
        CountryEntry {
            country: Some(country.to_string()),
            country_code: code.map(str::to_string),
            country_info: CountryInfo {
                iso2: None,
                iso3: None,
                flag: Some(format!("https://example.com/{}.png", country.to_lowercase())),
            },
            cases: Some(1000),
            deaths: Some(50),
            recovered: Some(400),
            active: Some(550),
            critical: Some(20),
            confirmed: Some(1000),
            today_cases: Some(30),
            today_deaths: Some(2),
            cases_per_one_million: Some(31.5),
            deaths_per_one_million: Some(1.6),
        }
    }

    fn snapshot(entries: Vec<CountryEntry>) -> StatsSnapshot {
        StatsSnapshot {
            data: entries,
            world_stats: WorldStats {
                country: None,
                cases: Some(2_000_000),
                deaths: Some(130_000),
                recovered: Some(500_000),
                active: Some(1_300_000),
                critical: Some(50_000),
                confirmed: Some(2_000_000),
                today_cases: Some(70_000),
                today_deaths: Some(5_000),
                cases_per_one_million: Some(256.4),
                deaths_per_one_million: Some(16.7),
            },
        }
    }

    /// Scripted source: returns a fixed result and counts fetches.
    struct FixedSource {
        result: Result<StatsSnapshot, ()>,
        fetches: Arc<AtomicUsize>,
    }

    impl StatsSource for FixedSource {
        async fn fetch_stats(&self) -> Result<StatsSnapshot, ApiError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map_err(|_| ApiError::MalformedResponse("scripted failure".to_string()))
        }
    }

    /// Source whose fetch never completes, for shutdown-while-in-flight.
    struct StalledSource;

    impl StatsSource for StalledSource {
        async fn fetch_stats(&self) -> Result<StatsSnapshot, ApiError> {
            std::future::pending().await
        }
    }

    fn tracker_with(
        cache: CacheStore,
        result: Result<StatsSnapshot, ()>,
    ) -> (
        Tracker<FixedSource>,
        mpsc::UnboundedReceiver<RefreshEvent>,
        Arc<AtomicUsize>,
    ) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = FixedSource {
            result,
            fetches: fetches.clone(),
        };
        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = Tracker::new(cache, source, Duration::from_secs(60), tx);
        (tracker, rx, fetches)
    }

    // ===== Code resolution =====

    #[test]
    fn test_resolve_prefers_explicit_code() {
        let mut e = entry("Peru", Some("PE"));
        e.country_info.iso2 = Some("XX".to_string());
        assert_eq!(resolve_country_code(&e), Some("PE".to_string()));
    }

    #[test]
    fn test_resolve_falls_through_empty_codes() {
        let mut e = entry("Peru", Some(""));
        e.country_info.iso2 = Some(String::new());
        e.country_info.iso3 = Some("PER".to_string());
        assert_eq!(resolve_country_code(&e), Some("PER".to_string()));
    }

    #[test]
    fn test_resolve_diamond_princess_overrides_reported_code() {
        let e = entry(DIAMOND_PRINCESS_NAME, Some("JP"));
        assert_eq!(
            resolve_country_code(&e),
            Some(DIAMOND_PRINCESS_CODE.to_string())
        );
    }

    #[test]
    fn test_resolve_unresolvable_entry() {
        let e = entry("Atlantis", None);
        assert_eq!(resolve_country_code(&e), None);
    }

    // ===== Record building =====

    #[test]
    fn test_missing_field_becomes_sentinel() {
        let mut e = entry("Peru", Some("PE"));
        e.critical = None;
        let record = build_record(&e, "PE".to_string(), "ts");
        assert_eq!(record.critical, -1);
    }

    #[test]
    fn test_reported_zero_conflated_with_missing() {
        // Upstream cannot tell "reported zero" from "absent"; both are -1.
        let mut e = entry("Peru", Some("PE"));
        e.today_deaths = Some(0);
        e.deaths_per_one_million = Some(0.0);
        let record = build_record(&e, "PE".to_string(), "ts");
        assert_eq!(record.today_deaths, -1);
        assert_eq!(record.deaths_per_one_million, -1.0);
    }

    #[test]
    fn test_world_record_keeps_zeros() {
        let mut world = snapshot(vec![]).world_stats;
        world.today_deaths = Some(0);
        world.recovered = None;
        let record = build_world_record(&world, "ts");
        assert_eq!(record.country_code, WORLD_CODE);
        assert_eq!(record.today_deaths, 0);
        assert_eq!(record.recovered, -1);
        assert_eq!(record.flag_url, "");
    }

    // ===== Cycle behavior =====

    #[tokio::test]
    async fn test_failed_cycle_leaves_cache_untouched() {
        let initial = {
            let mut store = CacheStore::new();
            store.upsert(build_record(&entry("Peru", Some("PE")), "PE".to_string(), "old"));
            store
        };
        let (mut tracker, mut rx, _) = tracker_with(initial.clone(), Err(()));

        tracker.refresh_once().await;

        assert_eq!(tracker.cache(), &initial);
        assert!(matches!(rx.try_recv(), Ok(RefreshEvent::Failed)));
        // Exactly one signal per cycle.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_successful_cycle_upserts_countries_and_world() {
        let entries = vec![entry("Peru", Some("PE")), entry("Canada", Some("CA"))];
        let (mut tracker, mut rx, _) = tracker_with(CacheStore::new(), Ok(snapshot(entries)));

        tracker.refresh_once().await;

        assert_eq!(tracker.cache().len(), 3);
        let world = tracker.cache().lookup(WORLD_CODE).expect("world row");
        assert_eq!(world.cases, 2_000_000);
        assert_eq!(world.flag_url, "");

        // All rows updated in one cycle share a timestamp.
        let peru = tracker.cache().lookup("PE").expect("peru row");
        assert_eq!(peru.timestamp, world.timestamp);

        match rx.try_recv() {
            Ok(RefreshEvent::Completed(records)) => assert_eq!(records.len(), 3),
            other => panic!("expected Completed, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unkeyable_entry_is_skipped() {
        let entries = vec![entry("Atlantis", None), entry("Peru", Some("PE"))];
        let (mut tracker, _rx, _) = tracker_with(CacheStore::new(), Ok(snapshot(entries)));

        tracker.refresh_once().await;

        // Peru plus the world row; Atlantis could not be keyed.
        assert_eq!(tracker.cache().len(), 2);
        assert!(tracker.cache().lookup("PE").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_are_sequential_with_single_pending_trigger() {
        let (tracker, _rx, fetches) =
            tracker_with(CacheStore::new(), Ok(snapshot(vec![entry("Peru", Some("PE"))])));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(tracker.run(shutdown_rx));

        // Immediate refresh at t=0, then one per 60s interval: fetches at
        // 0s, 60s and 120s. A leaked or doubled timer would add more.
        tokio::time::sleep(Duration::from_secs(150)).await;
        shutdown_tx.send(true).expect("tracker alive");

        let cache = handle.await.expect("run task");
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_mid_fetch_yields_valid_cache() {
        let initial = {
            let mut store = CacheStore::new();
            store.upsert(build_record(&entry("Peru", Some("PE")), "PE".to_string(), "old"));
            store
        };
        let (tx, _rx) = mpsc::unbounded_channel();
        let tracker = Tracker::new(
            initial.clone(),
            StalledSource,
            Duration::from_secs(60),
            tx,
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(tracker.run(shutdown_rx));
        // Let the fetch get in flight, then abort it.
        tokio::task::yield_now().await;
        shutdown_tx.send(true).expect("tracker alive");

        let cache = handle.await.expect("run task");
        assert_eq!(cache, initial);
        // Still flattens cleanly for persistence.
        assert_eq!(cache.serialize().len(), 1);
    }
}
