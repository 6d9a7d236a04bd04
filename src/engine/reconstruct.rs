// Ordered depth-first walk over a finished AggregationMap.

use super::aggregation::{AggregationMap, CollectedEntry};
use crate::config::NO_SECRET;

/// Concatenate every fragment below `root_key` in listing order.
///
/// Siblings are stably sorted by `order_index` since their fetches raced.
/// Each entry's fragment is emitted before anything recorded under its own
/// identifier. A missing bucket just means the node has no recorded children.
pub fn reconstruct(mut map: AggregationMap, root_key: &str) -> String {
    let mut output = String::new();
    let mut stack: Vec<CollectedEntry> = Vec::new();
    push_children(&mut map, root_key, &mut stack);

    while let Some(entry) = stack.pop() {
        if entry.fragment != NO_SECRET {
            output.push_str(&entry.fragment);
        }
        push_children(&mut map, &entry.child_id, &mut stack);
    }
    output
}

/// Push the bucket of `parent_id` so that its first child is popped first.
/// Buckets are taken out of the map, so each one is visited at most once.
fn push_children(map: &mut AggregationMap, parent_id: &str, stack: &mut Vec<CollectedEntry>) {
    if let Some(mut bucket) = map.take_bucket(parent_id) {
        bucket.sort_by_key(|e| e.order_index);
        stack.extend(bucket.into_iter().rev());
    }
}
