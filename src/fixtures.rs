//! Session-wide data and per-test setup/teardown.

use crate::config::data::DEFAULT_DATA_PATH;
use crate::config::settings::DEFAULT_CONFIG_PATH;
use crate::config::{Settings, TestData};
use crate::report::{Report, Status};
use crate::{Error, Result};
use eoka::{Browser, Page};
use futures::FutureExt;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Overrides the settings file path.
pub const CONFIG_PATH_ENV: &str = "CATALOG_E2E_CONFIG";

/// Overrides the test data file path.
pub const DATA_PATH_ENV: &str = "CATALOG_E2E_DATA";

static SESSION: OnceCell<Session> = OnceCell::new();

/// Install a test-friendly `tracing` subscriber honoring `RUST_LOG`.
///
/// Safe to call many times; only the first call has an effect.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Settings and test data shared, read-only, by every test in a process.
#[derive(Debug, Clone)]
pub struct Session {
    pub settings: Settings,
    pub data: TestData,
}

impl Session {
    /// Build a session from already loaded parts.
    pub fn new(settings: Settings, data: TestData) -> Self {
        Self { settings, data }
    }

    /// Load both files.
    pub fn load(config_path: impl AsRef<Path>, data_path: impl AsRef<Path>) -> Result<Self> {
        let settings = Settings::load(config_path)?;
        let data = TestData::load(data_path)?;
        Ok(Self::new(settings, data))
    }

    /// Load from the default paths, or those named by
    /// `CATALOG_E2E_CONFIG` / `CATALOG_E2E_DATA`.
    pub fn from_env() -> Result<Self> {
        let config_path = path_from_env(CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH);
        let data_path = path_from_env(DATA_PATH_ENV, DEFAULT_DATA_PATH);
        info!(
            "loading session from {} and {}",
            config_path.display(),
            data_path.display()
        );
        Self::load(config_path, data_path)
    }

    /// The process-wide session, loaded on first use.
    ///
    /// A failed load is not cached; every caller sees the error.
    pub fn shared() -> Result<&'static Session> {
        SESSION.get_or_try_init(Self::from_env)
    }
}

fn path_from_env(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// One test case: its report plus the setup/teardown around its body.
///
/// The body's outcome decides the report status: `Ok` passes, a panic
/// (failed `assert!`) or [`Error::AssertionFailed`] fails, any other
/// error marks the case broken. The report is written either way.
pub struct TestCase {
    report: Report,
    results_dir: PathBuf,
    headless: bool,
}

impl TestCase {
    /// Start a case labeled `feature / story / name`.
    pub fn new(session: &Session, feature: &str, story: &str, name: impl Into<String>) -> Self {
        init_tracing();
        Self {
            report: Report::start(feature, story, name),
            results_dir: session.settings.report.results_dir.clone(),
            headless: session.settings.browser.headless,
        }
    }

    /// The case's report, for inspection after the body has run.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Run a body that needs no browser.
    pub async fn run<T, F, Fut>(self, body: F) -> Result<T>
    where
        F: FnOnce(Report) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let report = self.report.clone();
        let outcome = AssertUnwindSafe(async move { body(report).await })
            .catch_unwind()
            .await;
        self.conclude(outcome)
    }

    /// Run a body against a fresh headless browser.
    ///
    /// The browser is closed after the body returns, fails or panics. A
    /// screenshot is attached to the report when the body did not succeed.
    pub async fn run_in_browser<T, F, Fut>(self, body: F) -> Result<T>
    where
        F: FnOnce(Arc<Page>, Report) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let browser = match self.launch().await {
            Ok(browser) => browser,
            Err(e) => return self.conclude(Ok(Err(e))),
        };

        let outcome = match browser.new_page("about:blank").await {
            Ok(page) => {
                let page = Arc::new(page);
                let (shared, report) = (Arc::clone(&page), self.report.clone());
                let outcome = AssertUnwindSafe(async move { body(shared, report).await })
                    .catch_unwind()
                    .await;
                if !matches!(outcome, Ok(Ok(_))) {
                    self.attach_screenshot(&page).await;
                }
                outcome
            }
            Err(e) => Ok(Err(e.into())),
        };

        debug!("closing browser");
        if let Err(e) = browser.close().await {
            warn!("browser teardown failed: {}", e);
        }
        self.conclude(outcome)
    }

    async fn launch(&self) -> Result<Browser> {
        let config = eoka::StealthConfig {
            headless: self.headless,
            ..Default::default()
        };
        debug!("launching browser (headless: {})", self.headless);
        Ok(Browser::launch_with_config(config).await?)
    }

    async fn attach_screenshot(&self, page: &Page) {
        match page.screenshot().await {
            Ok(png) => self.report.attach_bytes("Screenshot", "image/png", png),
            Err(e) => warn!("failure screenshot not taken: {}", e),
        }
    }

    fn conclude<T>(self, outcome: std::thread::Result<Result<T>>) -> Result<T> {
        let (status, message) = match &outcome {
            Ok(Ok(_)) => (Status::Passed, None),
            Ok(Err(e @ Error::AssertionFailed(_))) => (Status::Failed, Some(e.to_string())),
            Ok(Err(e)) => (Status::Broken, Some(e.to_string())),
            Err(payload) => (Status::Failed, Some(panic_message(payload.as_ref()))),
        };
        self.report.finish(status, message);
        if let Err(e) = self.report.write_to(&self.results_dir) {
            warn!(
                "could not write report to {}: {}",
                self.results_dir.display(),
                e
            );
        }

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test panicked".to_string()
    }
}
