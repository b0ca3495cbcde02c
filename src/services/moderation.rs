use crate::models::RawHit;

/// Static substring blocklist matched against a hit's `type_name`
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    terms: Vec<String>,
    enabled: bool,
}

impl Blocklist {
    pub fn new(terms: Vec<String>, enabled: bool) -> Self {
        Self { terms, enabled }
    }

    /// A blocklist that lets everything through
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_blocked(&self, hit: &RawHit) -> bool {
        self.enabled
            && self
                .terms
                .iter()
                .any(|term| hit.type_name.contains(term.as_str()))
    }

    /// Drops blocked hits, keeping the order of the rest
    pub fn retain_allowed(&self, mut hits: Vec<RawHit>) -> Vec<RawHit> {
        if !self.enabled {
            return hits;
        }

        let before = hits.len();
        hits.retain(|hit| !self.is_blocked(hit));

        if hits.len() < before {
            tracing::debug!(
                dropped = before - hits.len(),
                kept = hits.len(),
                "Moderation blocklist applied"
            );
        }

        hits
    }
}
