use crate::{Error, Result};
use ini::Ini;
use std::path::{Path, PathBuf};

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.ini";

/// Where result files go when `[report] results_dir` is not set.
pub const DEFAULT_RESULTS_DIR: &str = "target/e2e-results";

/// Environment settings read from `config.ini`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub ui: UiSettings,
    pub browser: BrowserSettings,
    pub report: ReportSettings,
}

/// `[api]` section.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
}

/// `[ui]` section.
#[derive(Debug, Clone)]
pub struct UiSettings {
    pub base_url: String,
}

/// `[browser]` section (optional).
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self { headless: true }
    }
}

/// `[report]` section (optional).
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub results_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
        }
    }
}

impl Settings {
    /// Load settings from an INI file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse settings from INI text.
    pub fn parse(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| Error::Ini(e.to_string()))?;

        let api = ApiSettings {
            base_url: required(&ini, "api", "base_url")?,
        };
        let ui = UiSettings {
            base_url: required(&ini, "ui", "base_url")?,
        };

        let mut browser = BrowserSettings::default();
        if let Some(value) = optional(&ini, "browser", "headless") {
            browser.headless = parse_bool(&value).ok_or_else(|| {
                Error::Config(format!("browser.headless: expected a boolean, got '{}'", value))
            })?;
        }

        let mut report = ReportSettings::default();
        if let Some(dir) = optional(&ini, "report", "results_dir") {
            report.results_dir = PathBuf::from(dir);
        }

        Ok(Self {
            api,
            ui,
            browser,
            report,
        })
    }
}

fn optional(ini: &Ini, section: &str, key: &str) -> Option<String> {
    ini.section(Some(section))
        .and_then(|props| props.get(key))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(ini: &Ini, section: &str, key: &str) -> Result<String> {
    let value = optional(ini, section, key)
        .ok_or_else(|| Error::Config(format!("{}.{} is required", section, key)))?;
    Ok(value.trim_end_matches('/').to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
