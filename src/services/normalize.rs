use std::fmt::Display;

use crate::models::{ContentKind, RawHit};

/// `normalized-title + "-" + year + "-" + kind`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Removes every whitespace character, not just the ends
pub fn normalize_title(title: &str) -> String {
    title.chars().filter(|c| !c.is_whitespace()).collect()
}

/// A single episode means movie; anything else is a series
pub fn inferred_kind(hit: &RawHit) -> ContentKind {
    if hit.episodes.len() == 1 {
        ContentKind::Movie
    } else {
        ContentKind::Tv
    }
}

pub fn identity_key(hit: &RawHit) -> IdentityKey {
    IdentityKey(format!(
        "{}-{}-{}",
        normalize_title(&hit.title),
        hit.year,
        inferred_kind(hit)
    ))
}
