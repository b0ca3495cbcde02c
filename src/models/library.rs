use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use super::Year;
use crate::error::AppError;

/// `source + "+" + id`, the key shared by favorites and play records
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey {
    pub source: String,
    pub id: String,
}

impl StorageKey {
    pub fn new(source: &str, id: &str) -> Self {
        Self {
            source: source.to_string(),
            id: id.to_string(),
        }
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}", self.source, self.id)
    }
}

impl FromStr for StorageKey {
    type Err = AppError;

    /// Splits at the first `+`; ids may themselves contain `+`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, id) = s
            .split_once('+')
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid storage key: {}", s)))?;
        Ok(Self::new(source, id))
    }
}

/// A saved favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub title: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub year: Year,
    #[serde(default)]
    pub cover: String,
    #[serde(default = "default_total_episodes")]
    pub total_episodes: usize,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub save_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_title: Option<String>,
}

fn default_total_episodes() -> usize {
    1
}

/// Playback progress for one source entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub title: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub year: Year,
    #[serde(default)]
    pub cover: String,
    /// Episode currently being watched (1-based)
    pub index: u32,
    #[serde(default = "default_total_episodes")]
    pub total_episodes: usize,
    /// Seconds into the current episode
    #[serde(default)]
    pub play_time: u64,
    /// Length of the current episode in seconds
    #[serde(default)]
    pub total_time: u64,
    #[serde(default)]
    pub save_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_title: Option<String>,
}

impl PlayRecord {
    /// Watched share of the current episode, in percent
    pub fn progress(&self) -> f64 {
        if self.total_time == 0 {
            return 0.0;
        }
        (self.play_time as f64 / self.total_time as f64 * 100.0).min(100.0)
    }
}

/// A favorite as listed to the user, with its playback position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteEntry {
    pub key: String,
    pub source: String,
    pub id: String,
    pub title: String,
    pub year: Year,
    pub poster: String,
    pub episodes: usize,
    pub source_name: String,
    pub current_episode: Option<u32>,
    pub search_title: Option<String>,
    pub save_time: i64,
}

/// Favorites newest first, joined with the play record stored under the
/// same key
pub fn favorite_entries(
    favorites: &BTreeMap<String, Favorite>,
    play_records: &BTreeMap<String, PlayRecord>,
) -> Vec<FavoriteEntry> {
    let mut entries: Vec<FavoriteEntry> = favorites
        .iter()
        .filter_map(|(key, favorite)| {
            let Ok(storage_key) = key.parse::<StorageKey>() else {
                tracing::warn!(key = %key, "Skipping favorite with malformed key");
                return None;
            };
            Some(FavoriteEntry {
                key: key.clone(),
                source: storage_key.source,
                id: storage_key.id,
                title: favorite.title.clone(),
                year: favorite.year,
                poster: favorite.cover.clone(),
                episodes: favorite.total_episodes,
                source_name: favorite.source_name.clone(),
                current_episode: play_records.get(key).map(|record| record.index),
                search_title: favorite.search_title.clone(),
                save_time: favorite.save_time,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.save_time.cmp(&a.save_time));
    entries
}

/// Play records newest first
pub fn recent_play_records(
    play_records: &BTreeMap<String, PlayRecord>,
) -> Vec<(String, PlayRecord)> {
    let mut records: Vec<(String, PlayRecord)> = play_records
        .iter()
        .map(|(key, record)| (key.clone(), record.clone()))
        .collect();
    records.sort_by(|(_, a), (_, b)| b.save_time.cmp(&a.save_time));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favorite(title: &str, save_time: i64) -> Favorite {
        Favorite {
            title: title.to_string(),
            source_name: "Alpha Cloud".to_string(),
            year: Year::Known(2013),
            cover: String::new(),
            total_episodes: 12,
            save_time,
            search_title: None,
        }
    }

    fn play_record(index: u32, save_time: i64) -> PlayRecord {
        PlayRecord {
            title: "Her".to_string(),
            source_name: "Alpha Cloud".to_string(),
            year: Year::Known(2013),
            cover: String::new(),
            index,
            total_episodes: 12,
            play_time: 30,
            total_time: 120,
            save_time,
            search_title: None,
        }
    }

    #[test]
    fn test_storage_key_round_trip() {
        let key: StorageKey = "alpha+8842".parse().unwrap();
        assert_eq!(key, StorageKey::new("alpha", "8842"));
        assert_eq!(key.to_string(), "alpha+8842");
    }

    #[test]
    fn test_storage_key_splits_at_first_plus() {
        let key: StorageKey = "alpha+a+b".parse().unwrap();
        assert_eq!(key.source, "alpha");
        assert_eq!(key.id, "a+b");
    }

    #[test]
    fn test_storage_key_without_separator() {
        assert!("alpha".parse::<StorageKey>().is_err());
    }

    #[test]
    fn test_favorite_entries_newest_first_with_episode() {
        let mut favorites = BTreeMap::new();
        favorites.insert("alpha+1".to_string(), favorite("Older", 100));
        favorites.insert("beta+2".to_string(), favorite("Newer", 200));

        let mut records = BTreeMap::new();
        records.insert("alpha+1".to_string(), play_record(4, 150));

        let entries = favorite_entries(&favorites, &records);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Newer");
        assert_eq!(entries[0].current_episode, None);
        assert_eq!(entries[1].title, "Older");
        assert_eq!(entries[1].source, "alpha");
        assert_eq!(entries[1].current_episode, Some(4));
    }

    #[test]
    fn test_recent_play_records() {
        let mut records = BTreeMap::new();
        records.insert("alpha+1".to_string(), play_record(1, 10));
        records.insert("beta+2".to_string(), play_record(2, 30));

        let recent = recent_play_records(&records);
        assert_eq!(recent[0].0, "beta+2");
        assert_eq!(recent[1].0, "alpha+1");
    }

    #[test]
    fn test_progress() {
        assert!((play_record(1, 0).progress() - 25.0).abs() < f64::EPSILON);
    }
}
