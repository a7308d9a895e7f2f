use crate::models::{CacheRow, CountryRecord, RecordField};

/// In-memory keyed collection of statistic records.
///
/// `country_code` is the sole lookup key and is unique within the store.
/// Insertion order is preserved for iteration; callers wanting a sorted
/// view ask for an index permutation via [`CacheStore::order_by`].
///
/// Expected cardinality is under ~200 rows, so lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStore {
    records: Vec<CountryRecord>,
}

impl CacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted flat rows. Rows were written by this
    /// same system, so they are assumed well-formed.
    pub fn load(rows: Vec<CacheRow>) -> Self {
        Self {
            records: rows.into_iter().map(CountryRecord::from_row).collect(),
        }
    }

    /// Replace the record with the same country code, or append if the
    /// code is new. Replacement is whole-record; there is no field merge.
    pub fn upsert(&mut self, record: CountryRecord) {
        match self.position(&record.country_code) {
            Some(idx) => self.records[idx] = record,
            None => self.records.push(record),
        }
    }

    /// Point lookup by country code.
    pub fn lookup(&self, country_code: &str) -> Option<&CountryRecord> {
        self.position(country_code).map(|idx| &self.records[idx])
    }

    /// Flatten every record back to the fixed column order.
    pub fn serialize(&self) -> Vec<CacheRow> {
        self.records.iter().map(CountryRecord::to_row).collect()
    }

    /// Stable ascending index permutation by the given field. Ties keep
    /// insertion order, so repeated sorts do not reshuffle equal rows.
    pub fn order_by(&self, field: RecordField) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.records.len()).collect();
        indices.sort_by(|&a, &b| field.compare(&self.records[a], &self.records[b]));
        indices
    }

    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, country_code: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.country_code == country_code)
    }
}
