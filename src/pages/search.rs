use super::{dom, SUBMIT_BUTTON};
use crate::report::Report;
use crate::{wait, Result};
use eoka::Page;
use tracing::{debug, info};

const SEARCH_INPUT: &str = "input[name='search']";
const MOVIE_TITLE: &str = ".movie-title";

/// The catalog home page with its search form.
pub struct SearchPage<'a> {
    page: &'a Page,
    report: &'a Report,
    url: String,
}

impl<'a> SearchPage<'a> {
    pub fn new(page: &'a Page, report: &'a Report, base_url: &str) -> Self {
        Self {
            page,
            report,
            url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Navigate to the home page.
    pub async fn open(&self) -> Result<()> {
        self.report
            .step("Open home page", async {
                info!("goto: {}", self.url);
                self.page.goto(&self.url).await?;
                Ok(())
            })
            .await
    }

    /// Replace the search field's content with `query` and submit.
    pub async fn search(&self, query: &str) -> Result<()> {
        self.report
            .step(format!("Search for '{}'", query), async {
                dom::require(self.page, SEARCH_INPUT).await?;
                dom::clear(self.page, SEARCH_INPUT).await?;
                self.page.fill(SEARCH_INPUT, query).await?;
                dom::require(self.page, SUBMIT_BUTTON).await?;
                self.page.click(SUBMIT_BUTTON).await?;
                Ok(())
            })
            .await
    }

    /// Titles of the rendered results, in page order.
    ///
    /// Waits for at least one visible title first; if none appears the
    /// result is a [`Timeout`](crate::Error::Timeout), so an empty result
    /// page and a broken one look the same here.
    pub async fn get_found_titles(&self) -> Result<Vec<String>> {
        self.report
            .step("Read found movie titles", async {
                wait::poll_ui(|| dom::visible_text(self.page, MOVIE_TITLE))
                    .await?
                    .require(&format!(
                        "'{}' not visible after {}ms",
                        MOVIE_TITLE,
                        wait::UI_TIMEOUT.as_millis()
                    ))?;
                let titles = dom::texts(self.page, MOVIE_TITLE).await?;
                debug!("found {} titles", titles.len());
                Ok(titles)
            })
            .await
    }
}
