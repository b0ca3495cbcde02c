use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub mod filters;
pub mod library;

pub use filters::{FilterState, FilterUpdate, Selection, SortMode, ViewMode};
pub use library::{Favorite, FavoriteEntry, PlayRecord, StorageKey};

/// Release year of a hit; anything that is not a plain number is `Unknown`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Year {
    Known(u16),
    #[default]
    Unknown,
}

impl Year {
    /// Sentinel used in identity keys and on the wire
    pub const UNKNOWN: &'static str = "unknown";

    /// Parses provider input, degrading anything unrecognised to `Unknown`
    pub fn lenient(raw: &str) -> Self {
        raw.parse().unwrap_or(Year::Unknown)
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Year::Known(year) => write!(f, "{}", year),
            Year::Unknown => f.write_str(Self::UNKNOWN),
        }
    }
}

impl FromStr for Year {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == Self::UNKNOWN {
            return Ok(Year::Unknown);
        }
        s.parse::<u16>()
            .map(Year::Known)
            .map_err(|_| AppError::InvalidInput(format!("Invalid year: {}", s)))
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Text(text)) => Year::lenient(&text),
            Some(Scalar::Number(n)) => u16::try_from(n).map_or(Year::Unknown, Year::Known),
            None => Year::Unknown,
        })
    }
}

/// Content kind inferred from the episode count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Tv,
}

impl ContentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Tv => "tv",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(ContentKind::Movie),
            "tv" => Ok(ContentKind::Tv),
            other => Err(AppError::InvalidInput(format!("Invalid content kind: {}", other))),
        }
    }
}

/// One per-source search hit as returned by the upstream search API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    /// Provider id
    #[serde(deserialize_with = "lenient_string")]
    pub source: String,
    /// Provider-scoped content id
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default)]
    pub year: Year,
    #[serde(default, deserialize_with = "lenient_string")]
    pub poster: String,
    /// Episode URLs; the length is the only signal of content kind
    #[serde(default, deserialize_with = "nullable_list")]
    pub episodes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source_name: String,
    /// Free-text category, only used for moderation
    #[serde(default, deserialize_with = "lenient_string")]
    pub type_name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_douban_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub douban_id: Option<u64>,
}

impl RawHit {
    /// Key used by the favorites and play-record stores
    pub fn storage_key(&self) -> StorageKey {
        StorageKey::new(&self.source, &self.id)
    }
}

/// Envelope of `GET /api/search`
///
/// Entries stay undecoded so one malformed hit cannot sink the response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "nullable_list")]
    pub results: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(u64),
}

/// Accepts strings, numbers or null (as empty)
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Zero, empty and unparseable ids all mean "no external id"
fn deserialize_douban_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    let id = match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(text)) => text.trim().parse().ok(),
        Some(Scalar::Number(n)) => Some(n),
        None => None,
    };
    Ok(id.filter(|id| *id != 0))
}
