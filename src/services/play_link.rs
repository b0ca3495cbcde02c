use urlencoding::encode;

use crate::models::{ContentKind, RawHit};

/// Target of a result card: the player page for one source entry
#[derive(Debug, Clone)]
pub struct PlayLink<'a> {
    hit: &'a RawHit,
    kind: ContentKind,
    prefer: bool,
    search_title: Option<&'a str>,
}

impl<'a> PlayLink<'a> {
    pub fn new(hit: &'a RawHit, kind: ContentKind) -> Self {
        Self {
            hit,
            kind,
            prefer: false,
            search_title: None,
        }
    }

    /// Lets the player pick a better source among equivalents
    pub fn prefer_best_source(mut self, prefer: bool) -> Self {
        self.prefer = prefer;
        self
    }

    /// Query the user searched with, when it differs from the title
    pub fn search_title(mut self, query: Option<&'a str>) -> Self {
        self.search_title = query.filter(|q| !q.trim().is_empty());
        self
    }

    pub fn to_url(&self) -> String {
        let mut url = format!(
            "/play?source={}&id={}&title={}&year={}",
            encode(&self.hit.source),
            encode(&self.hit.id),
            encode(&self.hit.title),
            self.hit.year,
        );
        if self.prefer {
            url.push_str("&prefer=true");
        }
        if let Some(query) = self.search_title {
            url.push_str("&stitle=");
            url.push_str(&encode(query.trim()));
        }
        url.push_str("&stype=");
        url.push_str(self.kind.label());
        url
    }
}
