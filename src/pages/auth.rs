use super::{dom, ERROR_MESSAGE, SUBMIT_BUTTON};
use crate::report::Report;
use crate::{wait, Result};
use eoka::Page;
use tracing::{debug, info, warn};

const LOGIN_INPUT: &str = "input[name='login']";
const PASSWORD_INPUT: &str = "input[name='password']";

/// Marker the logged-in layout renders somewhere in the page.
const LOGGED_IN_MARKER: &str = "logout";

/// The login page: open it, submit credentials, read the outcome.
pub struct AuthPage<'a> {
    page: &'a Page,
    report: &'a Report,
    url: String,
}

impl<'a> AuthPage<'a> {
    pub fn new(page: &'a Page, report: &'a Report, base_url: &str) -> Self {
        Self {
            page,
            report,
            url: format!("{}/login", base_url.trim_end_matches('/')),
        }
    }

    /// Navigate to the login page.
    pub async fn open(&self) -> Result<()> {
        self.report
            .step("Open login page", async {
                info!("goto: {}", self.url);
                self.page.goto(&self.url).await?;
                Ok(())
            })
            .await
    }

    /// Fill the login form with an email or phone and a password, then submit.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<()> {
        self.report
            .step(format!("Log in with email or phone: {}", identifier), async {
                let result = self.submit_credentials(identifier, secret).await;
                if let Err(ref e) = result {
                    warn!("login form: {}", e);
                    self.report.attach_text("Login form error", e.to_string());
                }
                result
            })
            .await
    }

    async fn submit_credentials(&self, identifier: &str, secret: &str) -> Result<()> {
        dom::require(self.page, LOGIN_INPUT).await?;
        self.page.fill(LOGIN_INPUT, identifier).await?;

        dom::require(self.page, PASSWORD_INPUT).await?;
        self.page.fill(PASSWORD_INPUT, secret).await?;

        dom::require(self.page, SUBMIT_BUTTON).await?;
        self.page.click(SUBMIT_BUTTON).await?;
        Ok(())
    }

    /// Text of the login error banner, or `""` if none shows up in time.
    pub async fn get_error(&self) -> Result<String> {
        self.report
            .step("Read error message", async {
                let lookup = wait::poll_ui(|| dom::visible_text(self.page, ERROR_MESSAGE)).await?;
                debug!("error banner: {:?}", lookup);
                Ok(lookup.found().unwrap_or_default())
            })
            .await
    }

    /// Whether the page shows the logged-in layout.
    ///
    /// Looks for the logout marker anywhere in the HTML, so a page that merely
    /// mentions it also counts.
    pub async fn is_logged_in(&self) -> Result<bool> {
        self.report
            .step("Check that the user is logged in", async {
                let source = dom::page_source(self.page).await?;
                Ok(source.contains(LOGGED_IN_MARKER))
            })
            .await
    }
}
