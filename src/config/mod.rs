use crate::models::{Credentials, Settings};
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use thiserror::Error;

/// Default settings file, relative to the current directory
pub const SETTINGS_FILE: &str = "Config.json";

/// Default credentials file, relative to the current directory
pub const CREDENTIALS_FILE: &str = "creds.secret";

/// Errors raised while loading a JSON configuration file.
///
/// Each variant maps to a distinct process exit code via [`ConfigError::exit_code`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{path} file not found")]
    NotFound { path: Utf8PathBuf },

    #[error("Key '{key}' is missing in the {path} file")]
    MissingKey { path: Utf8PathBuf, key: String },

    #[error("Error parsing {path}. Ensure the JSON is formatted correctly: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("An unexpected error occurred while loading {path}: {source}")]
    Unknown {
        path: Utf8PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ConfigError {
    /// Process exit status for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::NotFound { .. } => -1,
            ConfigError::MissingKey { .. } => -2,
            ConfigError::Parse { .. } => -3,
            ConfigError::Unknown { .. } => -4,
        }
    }

    fn from_json(path: &Utf8Path, err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Eof => ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            },
            Category::Data => match missing_field_name(&err) {
                Some(key) => ConfigError::MissingKey {
                    path: path.to_path_buf(),
                    key,
                },
                None => ConfigError::Unknown {
                    path: path.to_path_buf(),
                    source: err.into(),
                },
            },
            Category::Io => ConfigError::Unknown {
                path: path.to_path_buf(),
                source: err.into(),
            },
        }
    }
}

/// Extract `key` from serde's "missing field `key`" message.
fn missing_field_name(err: &serde_json::Error) -> Option<String> {
    let message = err.to_string();
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Read `path` and deserialize it as JSON into `T`.
///
/// Failures are logged here and classified into a [`ConfigError`]; the caller
/// is expected to terminate with [`ConfigError::exit_code`].
pub fn load_json_file<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let err = ConfigError::NotFound {
                path: path.to_path_buf(),
            };
            tracing::error!("{}", err);
            return Err(err);
        }
        Err(e) => {
            let err = ConfigError::Unknown {
                path: path.to_path_buf(),
                source: e.into(),
            };
            tracing::error!("{:?}", err);
            return Err(err);
        }
    };

    serde_json::from_str(&contents).map_err(|e| {
        let err = ConfigError::from_json(path, e);
        match &err {
            ConfigError::Unknown { .. } => tracing::error!("{:?}", err),
            _ => tracing::error!("{}", err),
        }
        err
    })
}

/// Locates and loads the settings and credentials files.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings_path: Utf8PathBuf,
    credentials_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Look for `Config.json` and `creds.secret` inside `config_dir`.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Self {
        let config_dir = config_dir.as_ref();
        Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            credentials_path: config_dir.join(CREDENTIALS_FILE),
        }
    }

    /// Use explicit file locations.
    pub fn with_paths(settings_path: Utf8PathBuf, credentials_path: Utf8PathBuf) -> Self {
        Self {
            settings_path,
            credentials_path,
        }
    }

    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let settings: Settings = load_json_file(&self.settings_path)?;
        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    pub fn load_credentials(&self) -> Result<Credentials, ConfigError> {
        let credentials: Credentials = load_json_file(&self.credentials_path)?;
        tracing::info!("Loaded credentials from {}", self.credentials_path);
        Ok(credentials)
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    pub fn credentials_path(&self) -> &Utf8Path {
        &self.credentials_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(".")
    }
}
