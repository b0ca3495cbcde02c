use crate::{
    error::{AppError, AppResult},
    models::{RawHit, SearchResponse},
    services::providers::{validate_hits, SearchProvider},
};
use reqwest::Client as HttpClient;
use std::time::Duration;

/// Calls `GET {api_url}/api/search?q=<query>`, expecting
/// `{ "results": [...] }` with one entry per source hit
#[derive(Clone)]
pub struct HttpSearchProvider {
    http_client: HttpClient,
    api_url: String,
}

impl HttpSearchProvider {
    pub fn new(api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, query: &str) -> AppResult<Vec<RawHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/api/search", self.api_url);

        // reqwest percent-encodes the query string
        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Search API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&response_text).inspect_err(|e| {
            tracing::error!(
                error = %e,
                query = %query,
                "Failed to deserialize search response"
            );
        })?;

        let decoded: Vec<RawHit> = parsed
            .results
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value(entry)
                    .inspect_err(|e| {
                        tracing::warn!(
                            error = %e,
                            provider = self.name(),
                            "Skipping undecodable search hit"
                        );
                    })
                    .ok()
            })
            .collect();
        let hits = validate_hits(decoded, self.name());

        tracing::info!(
            query = %query,
            results = hits.len(),
            provider = self.name(),
            "Upstream search returned"
        );

        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Year;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HttpSearchProvider {
        HttpSearchProvider::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .and(query_param("q", "star wars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {
                        "id": "1",
                        "title": "Star Wars",
                        "poster": "",
                        "episodes": ["e1"],
                        "source": "alpha",
                        "source_name": "Alpha Cloud",
                        "year": "1977",
                        "type_name": "Sci-Fi",
                        "douban_id": 1297447
                    },
                    {
                        "id": "2",
                        "title": "Star Wars",
                        "episodes": [],
                        "source": "beta"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let hits = provider(&server).search(" star wars ").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].year, Year::Known(1977));
        assert_eq!(hits[0].douban_id, Some(1297447));
    }

    #[tokio::test]
    async fn test_broken_entries_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "id": "1", "title": "Her", "episodes": ["e1"], "source": "alpha" },
                    { "id": "2", "title": "Her", "episodes": null, "source": "beta" },
                    { "id": "3", "title": null, "episodes": ["e1"], "source": "gamma" },
                    { "id": "4", "title": "Her", "episodes": [1, 2], "source": "delta" },
                    "garbage"
                ]
            })))
            .mount(&server)
            .await;

        let hits = provider(&server).search("Her").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, "alpha");
    }

    #[tokio::test]
    async fn test_search_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = provider(&server).search("dune").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_search_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = provider(&server).search("dune").await.unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let server = MockServer::start().await;
        let err = provider(&server).search("   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
