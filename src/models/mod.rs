//! Data models for tracked statistics.
//!
//! This module contains the per-country record type, the fixed persisted
//! column schema, and the sentinel codes used for non-country aggregates:
//!
//! - `CountryRecord`: one region's statistic snapshot
//! - `CacheRow`: the flat fixed-order persisted representation
//! - `RecordField`: sortable columns for menu ordering
//! - `WORLD_CODE` / `DIAMOND_PRINCESS_CODE`: reserved sentinel codes

pub mod country;

pub use country::{
    CacheRow, CountryRecord, RecordField, COLUMN_ORDER, DIAMOND_PRINCESS_CODE,
    DIAMOND_PRINCESS_NAME, WORLD_CODE,
};
