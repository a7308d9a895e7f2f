//! The cache store: the ordered, keyed collection of per-country
//! statistic records plus its flat persisted representation.
//!
//! The store is populated once at startup from persisted rows, mutated
//! in place by each refresh cycle (whole-record upsert), and flattened
//! back to rows exactly once at shutdown.

pub mod store;

pub use store::CacheStore;
