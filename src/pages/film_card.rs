use super::{dom, ERROR_MESSAGE};
use crate::report::Report;
use crate::{wait, Error, Result};
use eoka::Page;
use tracing::{info, warn};

const FILM_TITLE: &str = ".film-title";
const FILM_DESCRIPTION: &str = ".film-description";
const ACTORS: &str = ".film-actors .actor";
const POSTER_IMAGES: &str = ".film-poster img";
const DISABLED_CONTROL: &str = ".film-card [disabled]";

/// A single film's card: title, description, cast and poster.
pub struct FilmCardPage<'a> {
    page: &'a Page,
    report: &'a Report,
}

impl<'a> FilmCardPage<'a> {
    pub fn new(page: &'a Page, report: &'a Report) -> Self {
        Self { page, report }
    }

    /// Navigate to a card by its full URL.
    pub async fn open_by_url(&self, url: &str) -> Result<()> {
        self.report
            .step(format!("Open film card: {}", url), async {
                info!("goto: {}", url);
                self.page.goto(url).await?;
                Ok(())
            })
            .await
    }

    /// Waits for the title to be present, then reads it.
    pub async fn get_title(&self) -> Result<String> {
        self.report
            .step("Read film title", async {
                wait::poll_ui(|| dom::first_text(self.page, FILM_TITLE))
                    .await?
                    .require(&format!(
                        "'{}' not present after {}ms",
                        FILM_TITLE,
                        wait::UI_TIMEOUT.as_millis()
                    ))
            })
            .await
    }

    /// Description text, or `""` if the card has none.
    pub async fn get_description(&self) -> Result<String> {
        self.report
            .step("Read film description", async {
                let lookup = wait::once(dom::first_text(self.page, FILM_DESCRIPTION)).await?;
                Ok(lookup.found().unwrap_or_default())
            })
            .await
    }

    /// Actor names in cast order.
    pub async fn get_actors(&self) -> Result<Vec<String>> {
        self.report
            .step("Read actor list", dom::texts(self.page, ACTORS))
            .await
    }

    /// True if there is at least one poster image and every one is displayed.
    pub async fn has_poster(&self) -> Result<bool> {
        self.report
            .step("Check poster", async {
                let (total, visible) = dom::visibility(self.page, POSTER_IMAGES).await?;
                Ok(total > 0 && visible == total)
            })
            .await
    }

    /// Text of the card's error banner, or `""` if there is none.
    pub async fn get_error_message(&self) -> Result<String> {
        self.report
            .step("Read card error message", async {
                let lookup = wait::once(dom::first_text(self.page, ERROR_MESSAGE)).await?;
                Ok(lookup.found().unwrap_or_default())
            })
            .await
    }

    /// Whether a card title is present.
    pub async fn is_opened(&self) -> Result<bool> {
        self.report
            .step("Check that the film card is open", dom::exists(self.page, FILM_TITLE))
            .await
    }

    /// Click the actor at `index` in the cast list.
    pub async fn click_actor(&self, index: usize) -> Result<()> {
        self.report
            .step(format!("Click actor #{}", index), async {
                let len = dom::count(self.page, ACTORS).await?;
                if index >= len {
                    return Err(Error::IndexOutOfRange { index, len });
                }
                if !dom::click_nth(self.page, ACTORS, index).await? {
                    return Err(Error::ElementNotFound(format!("{} #{}", ACTORS, index)));
                }
                Ok(())
            })
            .await
    }

    /// Try to click a disabled control on the card.
    ///
    /// Fails with [`Error::ElementNotFound`] if the card has no disabled
    /// control; a rejected click is attached to the report and returned.
    pub async fn try_click_invalid_element(&self) -> Result<()> {
        self.report
            .step("Click a disabled element", async {
                if !dom::exists(self.page, DISABLED_CONTROL).await? {
                    return Err(Error::ElementNotFound(DISABLED_CONTROL.to_string()));
                }
                if let Err(e) = self.page.click(DISABLED_CONTROL).await {
                    warn!("click on disabled element: {}", e);
                    self.report
                        .attach_text("Click on disabled element failed", e.to_string());
                    return Err(e.into());
                }
                Ok(())
            })
            .await
    }
}
