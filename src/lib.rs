// imgbb-uploader - Batch upload a folder of images to ImgBB
//
// This is the library crate containing configuration loading, the browser
// automation seam and the upload pipeline. The binary crate (main.rs) wires
// them together.

pub mod browser;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use browser::{BrowserError, BrowserSession, ChromeBackend, Condition, Locator, UiBackend, Waiter};
pub use config::{ConfigError, ConfigManager, load_json_file};
pub use models::{Credentials, LinkMap, Settings, Timeouts};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
