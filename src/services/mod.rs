//! Services module - the upload pipeline.
//!
//! # Components
//!
//! - [`select_files`]: picks the images in the working folder (allow-list by
//!   extension, block-list by name, both case-insensitive)
//! - [`UploadService`]: drives the imgbb.com UI through login, file staging,
//!   album selection, upload and link export, one [`UploadStep`] at a time
//! - [`links`]: derives local file names from scraped direct links and
//!   writes the `<folder>_imgbb.txt` map
//! - [`run`]: the whole pipeline for one working folder
//!
//! # Failure model
//!
//! Each step waits on the page with a bounded [`Waiter`](crate::browser::Waiter).
//! The first step that fails aborts the attempt with an [`UploadError`]
//! naming that step. Nothing is retried and no partial results are written.

pub mod file_selection;
pub mod links;
pub mod pipeline;
pub mod upload;

pub use file_selection::select_files;
pub use links::{build_link_map, derive_file_name, output_path, split_links, write_link_map};
pub use pipeline::{RunError, RunSummary, run};
pub use upload::{UploadError, UploadService, UploadStep};
