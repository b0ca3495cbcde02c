use icu_collator::{Collator, CollatorOptions};
use std::cmp::Ordering;

use crate::models::{RawHit, SortMode, Year};

use super::aggregate::ResultGroup;
use super::normalize::normalize_title;

/// The user's query in the two shapes the comparators need
#[derive(Debug, Clone)]
pub struct RankQuery {
    trimmed: String,
    compact: String,
}

impl RankQuery {
    pub fn new(query: &str) -> Self {
        let trimmed = query.trim().to_string();
        let compact = normalize_title(&trimmed);
        Self { trimmed, compact }
    }
}

/// Anything the ranker can order
pub trait Rankable {
    fn rank_title(&self) -> &str;
    fn rank_year(&self) -> Year;
    /// Whether the item gets exact-match priority under relevance
    fn matches_query(&self, query: &RankQuery) -> bool;
}

impl Rankable for RawHit {
    fn rank_title(&self) -> &str {
        &self.title
    }

    fn rank_year(&self) -> Year {
        self.year
    }

    /// Flat hits need the title to equal the trimmed query
    fn matches_query(&self, query: &RankQuery) -> bool {
        self.title == query.trimmed
    }
}

impl Rankable for ResultGroup {
    fn rank_title(&self) -> &str {
        self.representative().map_or("", |hit| hit.title.as_str())
    }

    fn rank_year(&self) -> Year {
        self.representative().map_or(Year::Unknown, |hit| hit.year)
    }

    /// Groups only need the whitespace-free title to contain the
    /// whitespace-free query
    fn matches_query(&self, query: &RankQuery) -> bool {
        normalize_title(self.rank_title()).contains(&query.compact)
    }
}

thread_local! {
    // Root collation, shared by every comparison on this thread
    static COLLATOR: Option<Collator> = Collator::try_new(&Default::default(), CollatorOptions::new())
        .map_err(|e| tracing::warn!(error = %e, "Collator unavailable, using case-folded order"))
        .ok();
}

/// Locale-aware title order with a code-point tie-break, so the order is
/// total
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => {
                let folded_a = a.chars().flat_map(char::to_lowercase);
                let folded_b = b.chars().flat_map(char::to_lowercase);
                folded_a.cmp(folded_b)
            }
        })
        .then_with(|| a.cmp(b))
}

/// Newest first; unknown years after every known year
pub fn year_cmp(a: Year, b: Year) -> Ordering {
    match (a, b) {
        (Year::Known(a), Year::Known(b)) => b.cmp(&a),
        (Year::Known(_), Year::Unknown) => Ordering::Less,
        (Year::Unknown, Year::Known(_)) => Ordering::Greater,
        (Year::Unknown, Year::Unknown) => Ordering::Equal,
    }
}

pub fn compare<T: Rankable>(a: &T, b: &T, mode: SortMode, query: &RankQuery) -> Ordering {
    let by_year_then_title = || {
        year_cmp(a.rank_year(), b.rank_year())
            .then_with(|| locale_cmp(a.rank_title(), b.rank_title()))
    };

    match mode {
        SortMode::Relevance => {
            // matches first
            let priority = b.matches_query(query).cmp(&a.matches_query(query));
            priority.then_with(by_year_then_title)
        }
        SortMode::Year => by_year_then_title(),
        SortMode::Title => locale_cmp(a.rank_title(), b.rank_title()),
    }
}

/// Stable sort of `items` under `mode`; ties keep their input order
pub fn rank<T: Rankable>(mut items: Vec<T>, mode: SortMode, query: &str) -> Vec<T> {
    let query = RankQuery::new(query);
    items.sort_by(|a, b| compare(a, b, mode, &query));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregate::group;
    use crate::test_support::{hit, titles, HitExt};

    fn years(hits: &[RawHit]) -> Vec<String> {
        hits.iter().map(|h| h.year.to_string()).collect()
    }

    #[test]
    fn test_exact_match_beats_newer_year() {
        let hits = vec![
            hit("Dune Part Two").year(2024),
            hit("Dune").year(2021),
        ];
        let ranked = rank(hits, SortMode::Relevance, "Dune");
        assert_eq!(titles(&ranked), vec!["Dune", "Dune Part Two"]);
    }

    #[test]
    fn test_exact_match_uses_trimmed_query() {
        let hits = vec![hit("Dune Part Two").year(2024), hit("Dune").year(2021)];
        let ranked = rank(hits, SortMode::Relevance, "  Dune ");
        assert_eq!(ranked[0].title, "Dune");
    }

    #[test]
    fn test_year_mode_puts_unknown_last() {
        let hits = vec![
            hit("A").year(2020),
            hit("B"),
            hit("C").year(2019),
        ];
        let ranked = rank(hits, SortMode::Year, "");
        assert_eq!(years(&ranked), vec!["2020", "2019", "unknown"]);
    }

    #[test]
    fn test_year_mode_ignores_exact_match() {
        let hits = vec![hit("Dune").year(2021), hit("Dune Part Two").year(2024)];
        let ranked = rank(hits, SortMode::Year, "Dune");
        assert_eq!(titles(&ranked), vec!["Dune Part Two", "Dune"]);
    }

    #[test]
    fn test_equal_years_fall_back_to_title() {
        let hits = vec![
            hit("zebra").year(2020),
            hit("Apple").year(2020),
            hit("mango"),
            hit("Banana"),
        ];
        let ranked = rank(hits, SortMode::Relevance, "nothing");
        assert_eq!(titles(&ranked), vec!["Apple", "zebra", "Banana", "mango"]);
    }

    #[test]
    fn test_years_compare_numerically() {
        let hits = vec![hit("Old").year(999), hit("New").year(2001)];
        let ranked = rank(hits, SortMode::Year, "");
        assert_eq!(titles(&ranked), vec!["New", "Old"]);
    }

    #[test]
    fn test_title_mode_is_case_insensitive() {
        let hits = vec![
            hit("banana").year(2024),
            hit("Apple").year(1990),
            hit("cherry"),
        ];
        let ranked = rank(hits, SortMode::Title, "cherry");
        assert_eq!(titles(&ranked), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_sort_is_stable_for_identical_items() {
        let hits = vec![
            hit("Her").year(2013).source("a"),
            hit("Her").year(2013).source("b"),
            hit("Her").year(2013).source("c"),
        ];
        let ranked = rank(hits, SortMode::Relevance, "Her");
        let sources: Vec<&str> = ranked.iter().map(|h| h.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_groups_match_by_containment() {
        let groups = group(vec![
            hit("Arrival").year(2024),
            hit("The Dune Saga").year(2000),
        ]);
        let ranked = rank(groups, SortMode::Relevance, "Dune");
        assert_eq!(ranked[0].rank_title(), "The Dune Saga");
    }

    #[test]
    fn test_group_match_ignores_whitespace() {
        let groups = group(vec![hit("Other").year(2024), hit("Star Wars").year(1977)]);
        let ranked = rank(groups, SortMode::Relevance, " StarWars ");
        assert_eq!(ranked[0].rank_title(), "Star Wars");
    }

    // Flat relevance needs equality while aggregated relevance accepts
    // containment; both rules are kept deliberately distinct.
    #[test]
    fn test_flat_and_aggregated_match_rules_differ() {
        let query = RankQuery::new("Dune");
        let partial = hit("Dune Part Two").year(2024);
        assert!(!partial.matches_query(&query));

        let groups = group(vec![partial]);
        assert!(groups[0].matches_query(&query));
    }

    #[test]
    fn test_title_mode_sorts_accents_with_base_letter() {
        let hits = vec![hit("Zebra"), hit("Éclair"), hit("apple"), hit("ecole")];
        let ranked = rank(hits, SortMode::Title, "");
        assert_eq!(titles(&ranked), vec!["apple", "Éclair", "ecole", "Zebra"]);
    }

    #[test]
    fn test_locale_cmp_total_order() {
        assert_eq!(locale_cmp("abc", "ABC"), Ordering::Less);
        assert_eq!(locale_cmp("école", "ecole"), Ordering::Greater);
        assert_eq!(locale_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }
}
