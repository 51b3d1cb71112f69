use crate::browser::{BrowserError, UiBackend};
use crate::metrics::RunMetrics;
use crate::models::{Credentials, Settings};
use crate::services::file_selection::select_files;
use crate::services::links::{build_link_map, output_path, remove_stale_output, write_link_map};
use crate::services::upload::{UploadError, UploadService};
use camino::Utf8PathBuf;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files_staged: usize,
    pub links_recorded: usize,
    pub output_path: Utf8PathBuf,
    pub elapsed: Duration,
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to list files in {path}: {source}")]
    FileSelection {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Output {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Select, upload and record one working folder.
///
/// The previous output file is removed before the browser is started, so a
/// failed run leaves no output behind rather than a stale one.
pub fn run<B, F>(
    settings: &Settings,
    credentials: &Credentials,
    launch: F,
) -> Result<RunSummary, RunError>
where
    B: UiBackend,
    F: FnOnce(bool) -> Result<B, BrowserError>,
{
    let mut metrics = RunMetrics::new();
    let result = run_with_metrics(settings, credentials, launch, &mut metrics);
    metrics.log_summary();
    result
}

fn run_with_metrics<B, F>(
    settings: &Settings,
    credentials: &Credentials,
    launch: F,
    metrics: &mut RunMetrics,
) -> Result<RunSummary, RunError>
where
    B: UiBackend,
    F: FnOnce(bool) -> Result<B, BrowserError>,
{
    let working_path = &settings.working_path;

    let files = select_files(working_path, &settings.allowed_formats, &settings.ignored_files)
        .map_err(|source| RunError::FileSelection {
            path: working_path.clone(),
            source,
        })?;
    metrics.files_selected = files.len();

    let output = output_path(working_path);
    remove_stale_output(&output).map_err(|source| RunError::Output {
        path: output.clone(),
        source,
    })?;

    let links = UploadService::from_settings(settings).upload(launch, credentials, &files, metrics)?;

    let link_map = build_link_map(&links);
    write_link_map(&output, &link_map).map_err(|source| RunError::Output {
        path: output.clone(),
        source,
    })?;
    metrics.links_recorded = link_map.len();

    Ok(RunSummary {
        files_staged: metrics.files_staged,
        links_recorded: metrics.links_recorded,
        output_path: output,
        elapsed: metrics.elapsed(),
    })
}
