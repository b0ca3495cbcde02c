use serde::Serialize;

use crate::models::{ContentKind, FilterState, RawHit, ViewMode, Year};

use super::{
    aggregate::{self, ResultGroup},
    filter::{self, AvailableFilters},
    normalize::inferred_kind,
    play_link::PlayLink,
    rank,
};

/// One source entry contributing to an aggregated card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub key: String,
    pub source: String,
    pub id: String,
    pub source_name: String,
    pub episodes: usize,
}

/// A logical title merged from several sources
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCard {
    pub key: String,
    pub title: String,
    pub poster: String,
    pub source: String,
    pub id: String,
    pub year: Year,
    pub douban_id: Option<u64>,
    pub episodes: usize,
    pub kind: ContentKind,
    pub sources: Vec<SourceRef>,
    pub highlight_query: Option<String>,
    pub play_url: String,
}

/// A single source hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitCard {
    pub key: String,
    pub source: String,
    pub id: String,
    /// Title followed by the source's category label
    pub title: String,
    pub poster: String,
    pub year: Year,
    pub episodes: usize,
    pub source_name: String,
    pub douban_id: Option<u64>,
    pub kind: ContentKind,
    pub highlight_query: Option<String>,
    pub play_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "card", rename_all = "lowercase")]
pub enum ResultCard {
    Group(GroupCard),
    Hit(HitCard),
}

/// The query to highlight on a card, omitted when it equals the title
fn highlight_for(query: &str, title: &str) -> Option<String> {
    let query = query.trim();
    (!query.is_empty() && query != title).then(|| query.to_string())
}

impl GroupCard {
    fn from_group(group: &ResultGroup, query: &str) -> Option<Self> {
        let first = group.representative()?;
        let kind = group.kind();
        let highlight_query = highlight_for(query, &first.title);
        let play_url = PlayLink::new(first, kind)
            .prefer_best_source(true)
            .search_title(highlight_query.as_deref())
            .to_url();

        Some(Self {
            key: group.key.to_string(),
            title: first.title.clone(),
            poster: first.poster.clone(),
            source: first.source.clone(),
            id: first.id.clone(),
            year: first.year,
            douban_id: group.douban_id(),
            episodes: group.episode_count(),
            kind,
            sources: group
                .hits
                .iter()
                .map(|hit| SourceRef {
                    key: hit.storage_key().to_string(),
                    source: hit.source.clone(),
                    id: hit.id.clone(),
                    source_name: hit.source_name.clone(),
                    episodes: hit.episodes.len(),
                })
                .collect(),
            highlight_query,
            play_url,
        })
    }
}

impl HitCard {
    fn from_hit(hit: &RawHit, query: &str) -> Self {
        let kind = inferred_kind(hit);
        let highlight_query = highlight_for(query, &hit.title);
        let play_url = PlayLink::new(hit, kind)
            .search_title(highlight_query.as_deref())
            .to_url();

        Self {
            key: hit.storage_key().to_string(),
            source: hit.source.clone(),
            id: hit.id.clone(),
            title: format!("{} {}", hit.title, hit.type_name)
                .trim_end()
                .to_string(),
            poster: hit.poster.clone(),
            year: hit.year,
            episodes: hit.episodes.len(),
            source_name: hit.source_name.clone(),
            douban_id: hit.douban_id,
            kind,
            highlight_query,
            play_url,
        }
    }
}

/// Result of one pipeline run over the retained raw hits
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Facets of the unfiltered result set
    pub available: AvailableFilters,
    /// Hits that passed the filters
    pub matched_hits: usize,
    pub cards: Vec<ResultCard>,
}

/// Filters and ranks hits; in aggregated view, groups the ranked hits so
/// each group's first hit is its best-ranked one, then ranks the groups
pub fn run(raw: &[RawHit], filters: &FilterState, query: &str) -> PipelineOutput {
    let filtered = filter::apply(raw, filters);
    let matched_hits = filtered.len();
    let ranked = rank::rank(filtered, filters.sort_by, query);

    let cards = match filters.view_mode {
        ViewMode::Flat => ranked
            .iter()
            .map(|hit| ResultCard::Hit(HitCard::from_hit(hit, query)))
            .collect(),
        ViewMode::Aggregated => {
            let groups = rank::rank(aggregate::group(ranked), filters.sort_by, query);
            groups
                .iter()
                .filter_map(|group| GroupCard::from_group(group, query))
                .map(ResultCard::Group)
                .collect()
        }
    };

    PipelineOutput {
        available: filter::available_filters(raw),
        matched_hits,
        cards,
    }
}
