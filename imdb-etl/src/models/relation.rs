//! Immutable ordered collection of title records
//!
//! Derivations (filter, rank) build a new `Relation` that shares record
//! storage with its source through `Arc`, so the base relation is never copied
//! or mutated.

use std::collections::HashSet;
use std::sync::Arc;

use super::TitleRecord;

#[derive(Debug, Clone, Default)]
pub struct Relation {
    records: Vec<Arc<TitleRecord>>,
}

impl Relation {
    pub fn new(records: Vec<Arc<TitleRecord>>) -> Self {
        Self { records }
    }

    pub fn from_records(records: impl IntoIterator<Item = TitleRecord>) -> Self {
        records.into_iter().map(Arc::new).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Arc<TitleRecord>] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &TitleRecord> {
        self.records.iter().map(|r| r.as_ref())
    }

    /// Distinct `titleType` values in first-seen order
    pub fn distinct_title_types(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.title_type.as_str()))
            .map(|r| r.title_type.clone())
            .collect()
    }
}

impl FromIterator<Arc<TitleRecord>> for Relation {
    fn from_iter<I: IntoIterator<Item = Arc<TitleRecord>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
