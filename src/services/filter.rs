use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{ContentKind, FilterState, RawHit, Year};

use super::normalize::inferred_kind;

/// Values the user can choose from for the current result set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailableFilters {
    /// Known years, newest first
    pub years: Vec<Year>,
    /// Non-empty source names, ascending
    pub sources: Vec<String>,
    /// Inferred kinds, ascending by label
    pub kinds: Vec<ContentKind>,
}

pub fn available_filters(hits: &[RawHit]) -> AvailableFilters {
    let mut years = BTreeSet::new();
    let mut sources = BTreeSet::new();
    let mut kinds = BTreeSet::new();

    for hit in hits {
        if let Year::Known(year) = hit.year {
            years.insert(year);
        }
        if !hit.source_name.is_empty() {
            sources.insert(hit.source_name.clone());
        }
        kinds.insert(inferred_kind(hit));
    }

    AvailableFilters {
        years: years.into_iter().rev().map(Year::Known).collect(),
        sources: sources.into_iter().collect(),
        // variant order matches label order
        kinds: kinds.into_iter().collect(),
    }
}

/// Whether `hit` passes every selection in `filters`
pub fn admits(hit: &RawHit, filters: &FilterState) -> bool {
    filters.year.admits(&hit.year)
        && filters.source.admits(&hit.source_name)
        && filters.kind.admits(&inferred_kind(hit))
}

/// Keeps the hits admitted by `filters`, in their original order
pub fn apply(hits: &[RawHit], filters: &FilterState) -> Vec<RawHit> {
    hits.iter()
        .filter(|hit| admits(hit, filters))
        .cloned()
        .collect()
}
