use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{FilterState, FilterUpdate, RawHit, ViewMode},
};

use super::{
    filter::AvailableFilters,
    pipeline::{self, PipelineOutput, ResultCard},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    Idle,
    Loading,
    Results,
    Empty,
    Failed,
}

/// Where a query came from; decides how it is cleaned up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOrigin {
    /// Typed into the search box: trimmed, inner whitespace collapsed
    #[default]
    Form,
    /// Deep-linked `q` parameter: trimmed only
    Link,
}

impl QueryOrigin {
    /// Cleaned query, or `None` when it is blank
    pub fn normalize(self, raw: &str) -> Option<String> {
        let query = match self {
            QueryOrigin::Form => raw.split_whitespace().collect::<Vec<_>>().join(" "),
            QueryOrigin::Link => raw.trim().to_string(),
        };
        (!query.is_empty()).then_some(query)
    }
}

/// Proof of which query a provider response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Snapshot of a session as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub query: String,
    pub phase: SearchPhase,
    pub filters: FilterState,
    pub has_active_filters: bool,
    pub available: AvailableFilters,
    /// Hits retained from the provider, before filters
    pub total_hits: usize,
    /// Hits left after filters
    pub matched_hits: usize,
    pub results: Vec<ResultCard>,
    pub history: Vec<String>,
}

/// Per-user search state machine; never performs I/O
///
/// [`SearchSession::begin`] hands out a [`SearchTicket`] and
/// [`SearchSession::complete`] drops any response whose ticket is no longer
/// current. Filter and view changes rerun the pipeline over the retained
/// raw hits.
#[derive(Debug, Clone)]
pub struct SearchSession {
    generation: u64,
    phase: SearchPhase,
    query: String,
    raw_hits: Vec<RawHit>,
    filters: FilterState,
    output: PipelineOutput,
}

impl SearchSession {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            generation: 0,
            phase: SearchPhase::Idle,
            query: String::new(),
            raw_hits: Vec::new(),
            filters: FilterState::new(view_mode),
            output: PipelineOutput::default(),
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn raw_hits(&self) -> &[RawHit] {
        &self.raw_hits
    }

    pub fn results(&self) -> &[ResultCard] {
        &self.output.cards
    }

    /// Starts a new query, superseding any response still in flight
    pub fn begin(&mut self, query: String) -> SearchTicket {
        self.generation += 1;
        self.phase = SearchPhase::Loading;
        self.query = query;
        self.raw_hits.clear();
        self.output = PipelineOutput::default();
        SearchTicket {
            generation: self.generation,
        }
    }

    /// Delivers the provider outcome for `ticket`.
    ///
    /// Returns `false` when the ticket is stale and the outcome was
    /// discarded. A failed outcome leaves the session `Failed` with no
    /// results.
    pub fn complete(&mut self, ticket: SearchTicket, outcome: AppResult<Vec<RawHit>>) -> bool {
        if ticket.generation != self.generation || self.phase != SearchPhase::Loading {
            return false;
        }

        match outcome {
            Ok(hits) => {
                self.raw_hits = hits;
                self.phase = SearchPhase::Results;
                self.recompute();
            }
            Err(_) => {
                self.raw_hits.clear();
                self.output = PipelineOutput::default();
                self.phase = SearchPhase::Failed;
            }
        }
        true
    }

    /// Back to `Idle` with nothing retained; in-flight responses are dropped
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = SearchPhase::Idle;
        self.query.clear();
        self.raw_hits.clear();
        self.output = PipelineOutput::default();
    }

    pub fn update_filters(&mut self, update: FilterUpdate) {
        self.filters.apply_update(update);
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.recompute();
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.filters.view_mode = view_mode;
        self.recompute();
    }

    pub fn toggle_view_mode(&mut self) {
        self.set_view_mode(self.filters.view_mode.toggled());
    }

    fn recompute(&mut self) {
        self.output = pipeline::run(&self.raw_hits, &self.filters, &self.query);
        if matches!(self.phase, SearchPhase::Results | SearchPhase::Empty) {
            self.phase = if self.output.cards.is_empty() {
                SearchPhase::Empty
            } else {
                SearchPhase::Results
            };
        }
    }

    pub fn view(&self, history: Vec<String>) -> SearchView {
        SearchView {
            query: self.query.clone(),
            phase: self.phase,
            filters: self.filters.clone(),
            has_active_filters: self.filters.has_active_filters(),
            available: self.output.available.clone(),
            total_hits: self.raw_hits.len(),
            matched_hits: self.output.matched_hits,
            results: self.output.cards.clone(),
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Selection, Year};
    use crate::test_support::{hit, HitExt};

    fn hits() -> Vec<RawHit> {
        vec![
            hit("Dune").year(2021).source("a"),
            hit("Dune").year(2021).source("b"),
            hit("Arrival").year(2016),
        ]
    }

    #[test]
    fn test_query_normalization() {
        assert_eq!(
            QueryOrigin::Form.normalize("  star \t wars "),
            Some("star wars".to_string())
        );
        assert_eq!(
            QueryOrigin::Link.normalize("  star  wars "),
            Some("star  wars".to_string())
        );
        assert_eq!(QueryOrigin::Form.normalize(" \n "), None);
        assert_eq!(QueryOrigin::Link.normalize(""), None);
    }

    #[test]
    fn test_lifecycle_to_results() {
        let mut session = SearchSession::new(ViewMode::Aggregated);
        assert_eq!(session.phase(), SearchPhase::Idle);

        let ticket = session.begin("Dune".to_string());
        assert_eq!(session.phase(), SearchPhase::Loading);

        assert!(session.complete(ticket, Ok(hits())));
        assert_eq!(session.phase(), SearchPhase::Results);
        assert_eq!(session.results().len(), 2);
    }

    #[test]
    fn test_empty_provider_result() {
        let mut session = SearchSession::new(ViewMode::Flat);
        let ticket = session.begin("nothing".to_string());
        assert!(session.complete(ticket, Ok(Vec::new())));
        assert_eq!(session.phase(), SearchPhase::Empty);
    }

    #[test]
    fn test_failure_is_soft() {
        let mut session = SearchSession::new(ViewMode::Flat);
        let ticket = session.begin("Dune".to_string());
        let outcome = Err(AppError::ExternalApi("boom".to_string()));
        assert!(session.complete(ticket, outcome));
        assert_eq!(session.phase(), SearchPhase::Failed);
        assert!(session.results().is_empty());
        assert!(session.raw_hits().is_empty());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = SearchSession::new(ViewMode::Flat);
        let stale = session.begin("Dune".to_string());
        let current = session.begin("Arrival".to_string());
        assert!(stale.generation() < current.generation());

        assert!(!session.complete(stale, Ok(hits())));
        assert_eq!(session.phase(), SearchPhase::Loading);
        assert!(session.raw_hits().is_empty());

        assert!(session.complete(current, Ok(vec![hit("Arrival").year(2016)])));
        assert_eq!(session.query(), "Arrival");
        assert_eq!(session.raw_hits().len(), 1);
    }

    #[test]
    fn test_completed_ticket_cannot_be_replayed() {
        let mut session = SearchSession::new(ViewMode::Flat);
        let ticket = session.begin("Dune".to_string());
        assert!(session.complete(ticket, Ok(hits())));
        assert!(!session.complete(ticket, Ok(Vec::new())));
        assert_eq!(session.raw_hits().len(), 3);
    }

    #[test]
    fn test_reset_drops_in_flight_response() {
        let mut session = SearchSession::new(ViewMode::Flat);
        let ticket = session.begin("Dune".to_string());
        session.reset();
        assert!(!session.complete(ticket, Ok(hits())));
        assert_eq!(session.phase(), SearchPhase::Idle);
    }

    #[test]
    fn test_filter_changes_recompute_without_refetch() {
        let mut session = SearchSession::new(ViewMode::Flat);
        let ticket = session.begin("Dune".to_string());
        session.complete(ticket, Ok(hits()));
        let generation = session.generation();

        session.update_filters(FilterUpdate {
            year: Some(Selection::Only(Year::Known(1900))),
            ..FilterUpdate::default()
        });
        assert_eq!(session.phase(), SearchPhase::Empty);
        let view = session.view(Vec::new());
        assert_eq!(view.total_hits, 3);
        assert_eq!(view.matched_hits, 0);
        assert!(view.has_active_filters);

        session.clear_filters();
        assert_eq!(session.phase(), SearchPhase::Results);
        assert_eq!(session.results().len(), 3);
        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn test_toggle_view_mode() {
        let mut session = SearchSession::new(ViewMode::Aggregated);
        let ticket = session.begin("Dune".to_string());
        session.complete(ticket, Ok(hits()));
        assert_eq!(session.results().len(), 2);

        session.toggle_view_mode();
        assert_eq!(session.filters().view_mode, ViewMode::Flat);
        assert_eq!(session.results().len(), 3);

        session.set_view_mode(ViewMode::Aggregated);
        assert_eq!(session.results().len(), 2);
    }

    #[test]
    fn test_failed_phase_survives_filter_changes() {
        let mut session = SearchSession::new(ViewMode::Flat);
        let ticket = session.begin("Dune".to_string());
        session.complete(ticket, Err(AppError::ExternalApi("down".to_string())));
        session.toggle_view_mode();
        assert_eq!(session.phase(), SearchPhase::Failed);
    }
}
