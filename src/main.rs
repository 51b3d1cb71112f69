//! imgbb-uploader - upload a folder of images to ImgBB and record their direct links
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/App_Log.<date>.log (daily files, 30 kept) + stderr
//! 2. Load `Config.json` and `creds.secret` from the current directory;
//!    on failure exit with the loader's code (-1 not found, -2 missing key,
//!    -3 parse error, -4 unknown)
//! 3. Select files, remove the previous `<folder>_imgbb.txt`
//! 4. Drive Chrome through login and upload, scrape the direct links
//! 5. Write the file name → link map
//!
//! An upload failure is logged and the process still exits with 0.

use anyhow::Result;
use imgbb_uploader::logging::LoggingGuard;
use imgbb_uploader::services;
use imgbb_uploader::{APP_NAME, ChromeBackend, ConfigManager, VERSION};

fn main() -> Result<()> {
    let logging = imgbb_uploader::logging::setup_logging_with_console("logs", "App_Log", false, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::default();

    let settings = match config_manager.load_settings() {
        Ok(settings) => settings,
        Err(e) => exit_with(e.exit_code(), logging),
    };

    let credentials = match config_manager.load_credentials() {
        Ok(credentials) => credentials,
        Err(e) => exit_with(e.exit_code(), logging),
    };

    if settings.debug_mode {
        logging.set_debug_mode(true)?;
    }

    tracing::info!(
        "Uploading {} to album {} (headless={})",
        settings.working_path,
        credentials.imgbb_album_id,
        settings.headless_mode
    );

    match services::run(&settings, &credentials, ChromeBackend::launch) {
        Ok(summary) => {
            tracing::info!(
                outcome = "success",
                links = summary.links_recorded,
                "Upload has been completed for path: {}",
                settings.working_path
            );
        }
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!("Upload failed for path: {}", settings.working_path);
        }
    }

    Ok(())
}

/// Flush the log and terminate with `code`.
fn exit_with(code: i32, logging: LoggingGuard) -> ! {
    drop(logging);
    std::process::exit(code)
}
