pub mod data;
pub mod params;
pub mod settings;

pub use data::TestData;
pub use settings::{ApiSettings, BrowserSettings, ReportSettings, Settings, UiSettings};
