//! Filter engine: categorical sub-relation by `titleType`

use std::sync::Arc;

use crate::models::Relation;

/// Records whose `titleType` equals `title_type` exactly, in original order
///
/// Matching is case-sensitive with no normalization. No match yields an empty
/// relation, not an error.
pub fn filter_by_type(relation: &Relation, title_type: &str) -> Relation {
    relation
        .records()
        .iter()
        .filter(|r| r.title_type == title_type)
        .map(Arc::clone)
        .collect()
}
