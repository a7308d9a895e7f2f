use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Sentinel code for the world-aggregate row. Not an ISO code.
pub const WORLD_CODE: &str = "WRL";

/// Sentinel code for the Diamond Princess outbreak, which the upstream
/// source reports by name with no usable country code.
pub const DIAMOND_PRINCESS_CODE: &str = "DP";

/// Display name the upstream source uses for the Diamond Princess entry.
pub const DIAMOND_PRINCESS_NAME: &str = "Diamond Princess";

/// Persisted column order for the first 13 columns of a flat row.
/// `flagUrl` is always appended as the 14th column. This order is part
/// of the on-disk format and must not change.
pub const COLUMN_ORDER: [&str; 13] = [
    "countryCode",
    "country",
    "cases",
    "deaths",
    "recovered",
    "active",
    "critical",
    "confirmed",
    "timestamp",
    "todayCases",
    "todayDeaths",
    "casesPerOneMillion",
    "deathsPerOneMillion",
];

/// One flat persisted row, in the fixed column order above plus `flagUrl`
/// last. Serializes as a JSON array, mirroring the original packed
/// `(ssiiiiiisiidds)` tuple layout. A tuple struct rather than a plain
/// tuple: std trait impls stop at 12-arity tuples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRow(
    pub String, // countryCode
    pub String, // country
    pub i64,    // cases
    pub i64,    // deaths
    pub i64,    // recovered
    pub i64,    // active
    pub i64,    // critical
    pub i64,    // confirmed
    pub String, // timestamp
    pub i64,    // todayCases
    pub i64,    // todayDeaths
    pub f64,    // casesPerOneMillion
    pub f64,    // deathsPerOneMillion
    pub String, // flagUrl
);

/// One country's (or aggregate's) statistic snapshot at a given timestamp.
///
/// Numeric fields use `-1` as the "unknown" sentinel; a missing value from
/// the upstream source is never represented as an option here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country_code: String,
    pub country: String,
    pub cases: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active: i64,
    pub critical: i64,
    pub confirmed: i64,
    /// Shared by every row updated in the same refresh cycle.
    pub timestamp: String,
    pub today_cases: i64,
    pub today_deaths: i64,
    pub cases_per_one_million: f64,
    pub deaths_per_one_million: f64,
    /// Empty for the world-aggregate row.
    pub flag_url: String,
}

impl CountryRecord {
    /// Rebuild a record from its persisted flat row.
    pub fn from_row(row: CacheRow) -> Self {
        let CacheRow(
            country_code,
            country,
            cases,
            deaths,
            recovered,
            active,
            critical,
            confirmed,
            timestamp,
            today_cases,
            today_deaths,
            cases_per_one_million,
            deaths_per_one_million,
            flag_url,
        ) = row;

        Self {
            country_code,
            country,
            cases,
            deaths,
            recovered,
            active,
            critical,
            confirmed,
            timestamp,
            today_cases,
            today_deaths,
            cases_per_one_million,
            deaths_per_one_million,
            flag_url,
        }
    }

    /// Flatten this record back to the fixed column order, `flagUrl` last.
    pub fn to_row(&self) -> CacheRow {
        CacheRow(
            self.country_code.clone(),
            self.country.clone(),
            self.cases,
            self.deaths,
            self.recovered,
            self.active,
            self.critical,
            self.confirmed,
            self.timestamp.clone(),
            self.today_cases,
            self.today_deaths,
            self.cases_per_one_million,
            self.deaths_per_one_million,
            self.flag_url.clone(),
        )
    }

    /// True for the non-country sentinel rows (world aggregate, vessel).
    pub fn is_aggregate(&self) -> bool {
        self.country_code == WORLD_CODE || self.country_code == DIAMOND_PRINCESS_CODE
    }
}

/// A sortable record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    CountryCode,
    Country,
    Cases,
    Deaths,
    Recovered,
    Active,
    Critical,
    Confirmed,
    Timestamp,
    TodayCases,
    TodayDeaths,
    CasesPerOneMillion,
    DeathsPerOneMillion,
}

impl RecordField {
    /// Resolve a persisted column name to its field.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "countryCode" => Some(RecordField::CountryCode),
            "country" => Some(RecordField::Country),
            "cases" => Some(RecordField::Cases),
            "deaths" => Some(RecordField::Deaths),
            "recovered" => Some(RecordField::Recovered),
            "active" => Some(RecordField::Active),
            "critical" => Some(RecordField::Critical),
            "confirmed" => Some(RecordField::Confirmed),
            "timestamp" => Some(RecordField::Timestamp),
            "todayCases" => Some(RecordField::TodayCases),
            "todayDeaths" => Some(RecordField::TodayDeaths),
            "casesPerOneMillion" => Some(RecordField::CasesPerOneMillion),
            "deathsPerOneMillion" => Some(RecordField::DeathsPerOneMillion),
            _ => None,
        }
    }

    /// Get the persisted column name for this field.
    pub fn name(&self) -> &'static str {
        match self {
            RecordField::CountryCode => "countryCode",
            RecordField::Country => "country",
            RecordField::Cases => "cases",
            RecordField::Deaths => "deaths",
            RecordField::Recovered => "recovered",
            RecordField::Active => "active",
            RecordField::Critical => "critical",
            RecordField::Confirmed => "confirmed",
            RecordField::Timestamp => "timestamp",
            RecordField::TodayCases => "todayCases",
            RecordField::TodayDeaths => "todayDeaths",
            RecordField::CasesPerOneMillion => "casesPerOneMillion",
            RecordField::DeathsPerOneMillion => "deathsPerOneMillion",
        }
    }

    /// Compare two records by this field's natural ordering
    /// (lexicographic for the string columns).
    pub fn compare(&self, a: &CountryRecord, b: &CountryRecord) -> Ordering {
        match self {
            RecordField::CountryCode => a.country_code.cmp(&b.country_code),
            RecordField::Country => a.country.cmp(&b.country),
            RecordField::Cases => a.cases.cmp(&b.cases),
            RecordField::Deaths => a.deaths.cmp(&b.deaths),
            RecordField::Recovered => a.recovered.cmp(&b.recovered),
            RecordField::Active => a.active.cmp(&b.active),
            RecordField::Critical => a.critical.cmp(&b.critical),
            RecordField::Confirmed => a.confirmed.cmp(&b.confirmed),
            RecordField::Timestamp => a.timestamp.cmp(&b.timestamp),
            RecordField::TodayCases => a.today_cases.cmp(&b.today_cases),
            RecordField::TodayDeaths => a.today_deaths.cmp(&b.today_deaths),
            RecordField::CasesPerOneMillion => a
                .cases_per_one_million
                .partial_cmp(&b.cases_per_one_million)
                .unwrap_or(Ordering::Equal),
            RecordField::DeathsPerOneMillion => a
                .deaths_per_one_million
                .partial_cmp(&b.deaths_per_one_million)
                .unwrap_or(Ordering::Equal),
        }
    }
}
