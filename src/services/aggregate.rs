use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{ContentKind, RawHit};

use super::normalize::{identity_key, inferred_kind, IdentityKey};

/// How a majority vote settles a tie between equally frequent values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// The value whose running count first reaches the final maximum
    FirstToReachMax,
    /// The first distinct value, in first-seen order, holding the maximum
    FirstSeen,
}

/// Tie-break used for every representative field
pub const MAJORITY_TIE_BREAK: TieBreak = TieBreak::FirstToReachMax;

/// Most frequent value of `values`, `None` when empty.
///
/// Counts are accumulated in first-seen order so the result never
/// depends on hash iteration order.
pub fn majority<T, I>(values: I, tie_break: TieBreak) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut table: Vec<(T, usize)> = Vec::new();
    let mut slots: HashMap<T, usize> = HashMap::new();
    let mut leader: Option<(usize, usize)> = None; // (slot, count)

    for value in values {
        let slot = *slots.entry(value.clone()).or_insert_with(|| {
            table.push((value, 0));
            table.len() - 1
        });
        table[slot].1 += 1;
        let count = table[slot].1;
        if leader.map_or(true, |(_, best)| count > best) {
            leader = Some((slot, count));
        }
    }

    let (leader_slot, max) = leader?;
    let winner = match tie_break {
        TieBreak::FirstToReachMax => leader_slot,
        TieBreak::FirstSeen => table
            .iter()
            .position(|(_, count)| *count == max)
            .unwrap_or(leader_slot),
    };
    table.into_iter().nth(winner).map(|(value, _)| value)
}

/// Hits sharing one identity key, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultGroup {
    pub key: IdentityKey,
    pub hits: Vec<RawHit>,
}

impl ResultGroup {
    /// First hit; the canonical source of display fields
    pub fn representative(&self) -> Option<&RawHit> {
        self.hits.first()
    }

    /// Most common non-empty external catalog id
    pub fn douban_id(&self) -> Option<u64> {
        majority(
            self.hits.iter().filter_map(|hit| hit.douban_id),
            MAJORITY_TIE_BREAK,
        )
    }

    /// Most common episode count, 0 for an empty group
    pub fn episode_count(&self) -> usize {
        majority(
            self.hits
                .iter()
                .map(|hit| hit.episodes.len())
                .filter(|len| *len > 0),
            MAJORITY_TIE_BREAK,
        )
        .unwrap_or(0)
    }

    /// Kind of the representative hit
    pub fn kind(&self) -> ContentKind {
        self.representative()
            .map_or(ContentKind::Tv, inferred_kind)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Groups hits by identity key, preserving first-seen group order
pub fn group(hits: Vec<RawHit>) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();

    for hit in hits {
        let key = identity_key(&hit);
        match index.get(&key) {
            Some(&slot) => groups[slot].hits.push(hit),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ResultGroup {
                    key,
                    hits: vec![hit],
                });
            }
        }
    }

    groups
}
