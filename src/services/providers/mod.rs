use crate::{error::AppResult, models::RawHit};

pub mod http;

pub use http::HttpSearchProvider;

/// Trait for upstream search providers
///
/// Implementations validate hits at this boundary: anything returned is
/// well-formed (non-empty `episodes`), so the pipeline never has to.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search every upstream source for `query` (already trimmed)
    async fn search(&self, query: &str) -> AppResult<Vec<RawHit>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Drops hits that violate the pipeline's preconditions
pub fn validate_hits(hits: Vec<RawHit>, provider: &'static str) -> Vec<RawHit> {
    let before = hits.len();
    let valid: Vec<RawHit> = hits
        .into_iter()
        .filter(|hit| !hit.episodes.is_empty() && !hit.title.trim().is_empty())
        .collect();

    if valid.len() < before {
        tracing::warn!(
            provider = provider,
            dropped = before - valid.len(),
            "Dropped malformed search hits"
        );
    }

    valid
}
