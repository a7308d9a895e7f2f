//! covidtrack - a headless COVID-19 statistics tracker.
//!
//! The crate keeps an ordered, keyed cache of per-country statistic
//! records, refreshes it periodically from a public JSON endpoint, and
//! persists it as a flat row table across restarts. Presentation is left
//! to whatever hosts the tracker: the refresh cycle reports through
//! [`refresh::RefreshEvent`] signals, and the cache answers point lookups
//! and sorted-view queries for rendering.

pub mod api;
pub mod cache;
pub mod models;
pub mod refresh;
pub mod settings;
pub mod utils;

pub use api::{ApiError, StatsClient, StatsSource};
pub use cache::CacheStore;
pub use models::{CacheRow, CountryRecord, RecordField, DIAMOND_PRINCESS_CODE, WORLD_CODE};
pub use refresh::{RefreshEvent, Tracker};
pub use settings::{Settings, SettingsError};
