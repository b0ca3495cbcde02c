use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt::Display, str::FromStr};

use super::{ContentKind, Year};

/// A filter choice: either everything, or one specific value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => selected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T: Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_str("all"),
            Selection::Only(value) => serializer.collect_str(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "all" {
            return Ok(Selection::All);
        }
        raw.parse()
            .map(Selection::Only)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    Year,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One card per logical title
    #[serde(alias = "agg")]
    Aggregated,
    /// One card per source hit
    #[serde(alias = "all")]
    Flat,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Aggregated => ViewMode::Flat,
            ViewMode::Flat => ViewMode::Aggregated,
        }
    }
}

/// User-selected constraints for one search session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub year: Selection<Year>,
    pub source: Selection<String>,
    pub kind: Selection<ContentKind>,
    pub sort_by: SortMode,
    pub view_mode: ViewMode,
}

impl FilterState {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            year: Selection::All,
            source: Selection::All,
            kind: Selection::All,
            sort_by: SortMode::Relevance,
            view_mode,
        }
    }

    /// Resets year, source, kind and sort together; the view mode is a
    /// separate toggle and survives.
    pub fn clear(&mut self) {
        *self = Self::new(self.view_mode);
    }

    pub fn has_active_filters(&self) -> bool {
        !self.year.is_all()
            || !self.source.is_all()
            || !self.kind.is_all()
            || self.sort_by != SortMode::Relevance
    }

    pub fn apply_update(&mut self, update: FilterUpdate) {
        if let Some(year) = update.year {
            self.year = year;
        }
        if let Some(source) = update.source {
            self.source = source;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(sort_by) = update.sort_by {
            self.sort_by = sort_by;
        }
    }
}

/// Partial change to a [`FilterState`]; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterUpdate {
    #[serde(default)]
    pub year: Option<Selection<Year>>,
    #[serde(default)]
    pub source: Option<Selection<String>>,
    #[serde(default)]
    pub kind: Option<Selection<ContentKind>>,
    #[serde(default)]
    pub sort_by: Option<SortMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_serde() {
        let all: Selection<Year> = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(all, Selection::All);

        let year: Selection<Year> = serde_json::from_str("\"2019\"").unwrap();
        assert_eq!(year, Selection::Only(Year::Known(2019)));
        assert_eq!(serde_json::to_string(&year).unwrap(), "\"2019\"");

        let bad: Result<Selection<ContentKind>, _> = serde_json::from_str("\"anime\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_clear_keeps_view_mode() {
        let mut filters = FilterState::new(ViewMode::Flat);
        filters.year = Selection::Only(Year::Known(2020));
        filters.sort_by = SortMode::Title;
        assert!(filters.has_active_filters());

        filters.clear();
        assert!(!filters.has_active_filters());
        assert_eq!(filters.view_mode, ViewMode::Flat);
    }

    #[test]
    fn test_view_mode_does_not_count_as_active_filter() {
        let mut filters = FilterState::new(ViewMode::Aggregated);
        filters.view_mode = filters.view_mode.toggled();
        assert_eq!(filters.view_mode, ViewMode::Flat);
        assert!(!filters.has_active_filters());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut filters = FilterState::new(ViewMode::Aggregated);
        let update: FilterUpdate =
            serde_json::from_str(r#"{"source": "Alpha Cloud", "sort_by": "year"}"#).unwrap();
        filters.apply_update(update);

        assert_eq!(filters.source, Selection::Only("Alpha Cloud".to_string()));
        assert_eq!(filters.sort_by, SortMode::Year);
        assert_eq!(filters.year, Selection::All);
    }

    #[test]
    fn test_view_mode_aliases() {
        let mode: ViewMode = serde_json::from_str("\"agg\"").unwrap();
        assert_eq!(mode, ViewMode::Aggregated);
        let mode: ViewMode = serde_json::from_str("\"flat\"").unwrap();
        assert_eq!(mode, ViewMode::Flat);
    }
}
