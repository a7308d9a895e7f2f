//! HTTP client for the corona-stats statistics endpoint.
//!
//! One endpoint, one shot: a GET returning per-country aggregates plus a
//! world-totals object. There is no authentication and no pagination.

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::ApiError;

/// Statistics endpoint. A single GET returns everything we track.
const STATS_URL: &str = "https://corona-stats.online/";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough that a
/// missed cycle is noticed well before the next one is due.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Abstract fetch capability consumed by the refresh cycle.
///
/// The production implementation is [`StatsClient`]; tests drive the
/// tracker with scripted sources instead of a live endpoint.
pub trait StatsSource {
    fn fetch_stats(&self) -> impl Future<Output = Result<StatsSnapshot, ApiError>> + Send;
}

/// Client for the statistics API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct StatsClient {
    client: Client,
    base_url: String,
}

impl StatsClient {
    /// Create a new client against the public endpoint.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(STATS_URL.to_string())
    }

    /// Create a client against an alternate endpoint (mirrors, tests).
    pub fn with_base_url(base_url: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Fetch the current snapshot: all per-country entries plus world
    /// totals. A response is accepted wholesale or rejected wholesale.
    pub async fn fetch(&self) -> Result<StatsSnapshot, ApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("format", "json"), ("source", "2")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let text = response.text().await?;
        let snapshot: StatsSnapshot = serde_json::from_str(&text)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        debug!(countries = snapshot.data.len(), "Stats snapshot received");
        Ok(snapshot)
    }
}

impl StatsSource for StatsClient {
    async fn fetch_stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.fetch().await
    }
}

// ============================================================================
// Raw response types
// ============================================================================

/// Top-level response shape. Both fields are required; their absence is a
/// malformed response, not an empty one.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsSnapshot {
    pub data: Vec<CountryEntry>,
    #[serde(rename = "worldStats")]
    pub world_stats: WorldStats,
}

/// One per-country entry as reported upstream. Every statistic is optional
/// here; normalization to the `-1` sentinel happens when the entry is
/// turned into a cache record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryEntry {
    pub country: Option<String>,
    #[serde(rename = "countryCode")]
    pub country_code: Option<String>,
    #[serde(rename = "countryInfo", default)]
    pub country_info: CountryInfo,
    pub cases: Option<i64>,
    pub deaths: Option<i64>,
    pub recovered: Option<i64>,
    pub active: Option<i64>,
    pub critical: Option<i64>,
    pub confirmed: Option<i64>,
    #[serde(rename = "todayCases")]
    pub today_cases: Option<i64>,
    #[serde(rename = "todayDeaths")]
    pub today_deaths: Option<i64>,
    #[serde(rename = "casesPerOneMillion")]
    pub cases_per_one_million: Option<f64>,
    #[serde(rename = "deathsPerOneMillion")]
    pub deaths_per_one_million: Option<f64>,
}

/// Secondary code/flag block carried by each entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryInfo {
    pub iso2: Option<String>,
    pub iso3: Option<String>,
    pub flag: Option<String>,
}

/// World-totals object, same statistic columns as a country entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldStats {
    pub country: Option<String>,
    pub cases: Option<i64>,
    pub deaths: Option<i64>,
    pub recovered: Option<i64>,
    pub active: Option<i64>,
    pub critical: Option<i64>,
    pub confirmed: Option<i64>,
    #[serde(rename = "todayCases")]
    pub today_cases: Option<i64>,
    #[serde(rename = "todayDeaths")]
    pub today_deaths: Option<i64>,
    #[serde(rename = "casesPerOneMillion")]
    pub cases_per_one_million: Option<f64>,
    #[serde(rename = "deathsPerOneMillion")]
    pub deaths_per_one_million: Option<f64>,
}
