//! HTTP client module for the public statistics endpoint.
//!
//! This module provides the `StatsClient` for fetching JSON-formatted
//! aggregate data for all countries plus a world total, and the
//! `StatsSource` trait the refresh cycle consumes so it never depends on
//! a concrete transport.

pub mod client;
pub mod error;

pub use client::{CountryEntry, CountryInfo, StatsClient, StatsSnapshot, StatsSource, WorldStats};
pub use error::ApiError;
