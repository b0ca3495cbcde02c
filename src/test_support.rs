use crate::models::{RawHit, Year};

/// A one-episode hit from source `alpha` with an unknown year
pub fn hit(title: &str) -> RawHit {
    RawHit {
        source: "alpha".to_string(),
        id: "1".to_string(),
        title: title.to_string(),
        year: Year::Unknown,
        poster: format!("https://img.example/{}.jpg", title.replace(' ', "_")),
        episodes: vec!["https://cdn.example/ep1.m3u8".to_string()],
        source_name: "Alpha Cloud".to_string(),
        type_name: String::new(),
        douban_id: None,
    }
}

/// Chained setters for test hits
pub trait HitExt {
    fn year(self, year: u16) -> Self;
    fn source(self, source: &str) -> Self;
    fn id(self, id: &str) -> Self;
    fn source_name(self, name: &str) -> Self;
    fn type_name(self, name: &str) -> Self;
    fn episodes(self, count: usize) -> Self;
    fn douban(self, id: u64) -> Self;
}

impl HitExt for RawHit {
    fn year(mut self, year: u16) -> Self {
        self.year = Year::Known(year);
        self
    }

    fn source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    fn source_name(mut self, name: &str) -> Self {
        self.source_name = name.to_string();
        self
    }

    fn type_name(mut self, name: &str) -> Self {
        self.type_name = name.to_string();
        self
    }

    fn episodes(mut self, count: usize) -> Self {
        self.episodes = (1..=count)
            .map(|n| format!("https://cdn.example/ep{}.m3u8", n))
            .collect();
        self
    }

    fn douban(mut self, id: u64) -> Self {
        self.douban_id = Some(id);
        self
    }
}

pub fn titles(hits: &[RawHit]) -> Vec<&str> {
    hits.iter().map(|h| h.title.as_str()).collect()
}
