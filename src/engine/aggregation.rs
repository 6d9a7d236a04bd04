// Parent-keyed collection of crawl results, filled by the collection loop only.

use std::collections::HashMap;

/// One fetched node, recorded under the parent that scheduled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedEntry {
    /// Identifier the fetch was issued for.
    pub child_id: String,
    /// Fragment as reported, sentinel included.
    pub fragment: String,
    /// Position among the parent's listed children.
    pub order_index: usize,
}

/// Append-only map from parent identifier to the entries fetched beneath it.
/// Buckets hold entries in arrival order.
#[derive(Debug, Default)]
pub struct AggregationMap {
    buckets: HashMap<String, Vec<CollectedEntry>>,
    entries: usize,
}

impl AggregationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, parent_id: &str, entry: CollectedEntry) {
        self.buckets
            .entry(parent_id.to_string())
            .or_default()
            .push(entry);
        self.entries += 1;
    }

    pub fn bucket(&self, parent_id: &str) -> Option<&[CollectedEntry]> {
        self.buckets.get(parent_id).map(Vec::as_slice)
    }

    /// Detach a bucket. Only the reconstructor, which owns the map, does this.
    pub(crate) fn take_bucket(&mut self, parent_id: &str) -> Option<Vec<CollectedEntry>> {
        self.buckets.remove(parent_id)
    }

    /// Total number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}
