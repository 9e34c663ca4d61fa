//! Client for the catalog's public movie API.

use crate::report::Report;
use crate::Result;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{info, warn};

/// Timeout applied to every API request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// One catalog entry. Fields the client does not model are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub alternative_name: Option<String>,
    pub en_name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Movie {
    /// Best available display title.
    pub fn title(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.alternative_name.as_deref())
            .or(self.en_name.as_deref())
    }
}

/// Body of `GET /movie/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<Movie>,
    pub total: Option<u64>,
    pub limit: Option<u64>,
    pub page: Option<u64>,
    pub pages: Option<u64>,
}

/// Whether a request carries the API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    WithKey,
    WithoutKey,
}

/// Raw response for checks on the status code itself.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed body, or `Value::Null` if it was not JSON.
    pub body: Value,
}

impl ApiResponse {
    /// The `docs` list, empty if the body has none.
    pub fn docs(&self) -> &[Value] {
        self.body
            .get("docs")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Search and lookup against the movie API.
pub struct MovieApi<'r> {
    client: Client,
    base_url: String,
    api_key: String,
    report: &'r Report,
}

impl<'r> MovieApi<'r> {
    pub fn new(base_url: &str, api_key: impl Into<String>, report: &'r Report) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            report,
        })
    }

    /// Base URL without a trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /movie/search?query=...`; a non-2xx status is an error.
    pub async fn search_movie(&self, query: &str) -> Result<SearchResponse> {
        self.report
            .step(format!("Search movie via API: {}", query), async {
                info!("GET /movie/search query={:?}", query);
                self.fetch_json(self.search_request(query, Auth::WithKey))
                    .await
            })
            .await
    }

    /// `GET /movie/{id}`; a non-2xx status is an error.
    pub async fn get_movie(&self, id: u64) -> Result<Movie> {
        self.report
            .step(format!("Get movie with id {}", id), async {
                info!("GET /movie/{}", id);
                let request = self
                    .client
                    .get(format!("{}/movie/{}", self.base_url, id))
                    .header(API_KEY_HEADER, &self.api_key);
                self.fetch_json(request).await
            })
            .await
    }

    /// `GET /movie/search?query=...` returning the status as-is.
    pub async fn search_status(&self, query: &str, auth: Auth) -> Result<ApiResponse> {
        let name = match auth {
            Auth::WithKey => format!("GET /movie/search?query={}", query),
            Auth::WithoutKey => format!("GET /movie/search?query={} without API key", query),
        };
        self.report
            .step(name, async {
                let result: Result<ApiResponse> = async {
                    let response = self.search_request(query, auth).send().await?;
                    let status = response.status().as_u16();
                    let text = response.text().await?;
                    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
                    Ok(ApiResponse { status, body })
                }
                .await;
                self.record_failure(result)
            })
            .await
    }

    fn search_request(&self, query: &str, auth: Auth) -> RequestBuilder {
        let request = self
            .client
            .get(format!("{}/movie/search", self.base_url))
            .query(&[("query", query)]);
        match auth {
            Auth::WithKey => request.header(API_KEY_HEADER, &self.api_key),
            Auth::WithoutKey => request,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let result: Result<T> = async {
            let response = request.send().await?.error_for_status()?;
            Ok(response.json::<T>().await?)
        }
        .await;
        self.record_failure(result)
    }

    fn record_failure<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(ref e) = result {
            warn!("API request failed: {}", e);
            self.report.attach_text("API error", e.to_string());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_defaults() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.docs.is_empty());
        assert_eq!(parsed.total, None);
    }

    #[test]
    fn test_movie_keeps_unknown_fields() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 258687,
            "name": "Интерстеллар",
            "alternativeName": "Interstellar",
            "year": 2014,
            "rating": { "kp": 8.6 }
        }))
        .unwrap();
        assert_eq!(movie.id, Some(258687));
        assert_eq!(movie.alternative_name.as_deref(), Some("Interstellar"));
        assert_eq!(movie.title(), Some("Интерстеллар"));
        assert_eq!(movie.extra["rating"]["kp"], json!(8.6));
    }

    #[test]
    fn test_title_fallback() {
        let movie = Movie {
            en_name: Some("Interstellar".into()),
            ..Default::default()
        };
        assert_eq!(movie.title(), Some("Interstellar"));
        assert_eq!(Movie::default().title(), None);
    }

    #[test]
    fn test_api_response_docs() {
        let response = ApiResponse {
            status: 200,
            body: json!({ "docs": [{ "id": 1 }, { "id": 2 }] }),
        };
        assert_eq!(response.docs().len(), 2);

        let unauthorized = ApiResponse {
            status: 401,
            body: json!({ "message": "no key" }),
        };
        assert!(unauthorized.docs().is_empty());
    }

    #[test]
    fn test_base_url_normalized() {
        let report = Report::start("API", "unit", "base url");
        let api = MovieApi::new("http://localhost:9/v1.4/", "key", &report).unwrap();
        assert_eq!(api.base_url(), "http://localhost:9/v1.4");
    }
}
