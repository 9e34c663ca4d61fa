//! # catalog-e2e
//!
//! End-to-end checks for a movie catalog: an HTTP client for the public search
//! API, page objects for the login, search and film card pages, session and
//! per-test fixtures, and a step recorder that writes one result file per test.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_e2e::{MovieApi, Session, TestCase};
//!
//! # #[tokio::main]
//! # async fn main() -> catalog_e2e::Result<()> {
//! let session = Session::shared()?;
//! let case = TestCase::new(session, "API search", "Positive", "exact title");
//! case.run(|report| async move {
//!     let api = MovieApi::new(&session.settings.api.base_url, session.data.api_key()?, &report)?;
//!     let found = api.search_movie(session.data.get("search_exact")?).await?;
//!     assert!(!found.docs.is_empty());
//!     Ok(())
//! })
//! .await
//! # }
//! ```

pub mod api;
pub mod config;
pub mod fixtures;
pub mod pages;
pub mod report;
pub mod wait;

pub use api::{ApiResponse, Auth, Movie, MovieApi, SearchResponse};
pub use config::{Settings, TestData};
pub use fixtures::{init_tracing, Session, TestCase};
pub use pages::{AuthPage, FilmCardPage, SearchPage};
pub use report::{Report, Status};
pub use wait::Lookup;

/// Result type for catalog-e2e operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by fixtures, the API client and page objects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("ini parse error: {0}")]
    Ini(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("index {index} out of range ({len} elements)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("assertion failed: {0}")]
    AssertionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::IndexOutOfRange { index: 5, len: 1 };
        assert_eq!(err.to_string(), "index 5 out of range (1 elements)");

        let err = Error::Timeout("'.movie-title' not visible after 5000ms".into());
        assert!(err.to_string().starts_with("timeout: "));
    }

    #[test]
    fn test_json_error_converts() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Json(_)));
    }
}
