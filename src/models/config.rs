use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// General settings from Config.json
///
/// Every field except `debug_mode` and `timeouts` is required; a missing key
/// surfaces as [`ConfigError::MissingKey`](crate::config::ConfigError::MissingKey).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Folder whose images are uploaded
    pub working_path: Utf8PathBuf,

    /// Extensions to upload, including the leading dot (e.g. ".jpg")
    pub allowed_formats: Vec<String>,

    /// File names that are never uploaded
    pub ignored_files: Vec<String>,

    /// Visible label of the embed-code option to scrape (e.g. "Direct links")
    pub link_export_types: String,

    pub headless_mode: bool,

    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Per-step wait budgets for the browser automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_element_secs")]
    pub element_secs: u64,

    #[serde(default = "default_album_secs")]
    pub album_secs: u64,

    #[serde(default = "default_upload_secs")]
    pub upload_secs: u64,

    #[serde(default = "default_file_stage_delay_ms")]
    pub file_stage_delay_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Timeouts {
    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn album(&self) -> Duration {
        Duration::from_secs(self.album_secs)
    }

    pub fn upload(&self) -> Duration {
        Duration::from_secs(self.upload_secs)
    }

    pub fn file_stage_delay(&self) -> Duration {
        Duration::from_millis(self.file_stage_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_secs: default_element_secs(),
            album_secs: default_album_secs(),
            upload_secs: default_upload_secs(),
            file_stage_delay_ms: default_file_stage_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_element_secs() -> u64 {
    10
}

fn default_album_secs() -> u64 {
    20
}

fn default_upload_secs() -> u64 {
    60
}

fn default_file_stage_delay_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    250
}

/// Account credentials from creds.secret
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub imgbb_username: String,
    pub imgbb_password: String,
    pub imgbb_album_id: String,
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("imgbb_username", &self.imgbb_username)
            .field("imgbb_password", &"<redacted>")
            .field("imgbb_album_id", &self.imgbb_album_id)
            .finish()
    }
}
