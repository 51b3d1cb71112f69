use crate::browser::{BrowserError, BrowserSession, Condition, UiBackend, Waiter};
use crate::metrics::RunMetrics;
use crate::models::{Credentials, Settings, Timeouts};
use crate::services::links::split_links;
use camino::Utf8PathBuf;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const LOGIN_URL: &str = "https://imgbb.com/login";
pub const HOME_URL: &str = "https://imgbb.com/";

/// Page the site redirects to after a successful login
pub fn landing_url(username: &str) -> String {
    format!("https://{}.imgbb.com/", username)
}

/// Element locators for the imgbb.com UI.
///
/// These must match the live site exactly; nothing else in the crate knows
/// about its markup.
pub mod selectors {
    use crate::browser::Locator;

    pub fn username_field() -> Locator {
        Locator::name("login-subject")
    }

    pub fn password_field() -> Locator {
        Locator::name("password")
    }

    pub fn sign_in_button() -> Locator {
        Locator::xpath(
            "//form[@data-action='validate']//button[@type='submit' and contains(text(), 'Sign in')]",
        )
    }

    pub fn start_uploading_button() -> Locator {
        Locator::xpath(
            "//div[@id='home-cover-content']//a[@data-trigger='anywhere-upload-input' and contains(text(), 'Start uploading')]",
        )
    }

    pub fn file_input() -> Locator {
        Locator::xpath("//input[@type='file']")
    }

    pub fn album_select() -> Locator {
        Locator::id("upload-album-id")
    }

    pub fn upload_button() -> Locator {
        Locator::xpath(
            "//div[@id='anywhere-upload-submit']//button[@data-action='upload' and contains(text(), 'Upload')]",
        )
    }

    /// Embed-codes panel shown once the upload has been processed
    pub fn results_panel() -> Locator {
        Locator::class("copy-hover-display")
    }

    pub fn embed_toggle() -> Locator {
        Locator::id("uploaded-embed-toggle").within(results_panel())
    }

    pub fn direct_links_textarea() -> Locator {
        Locator::xpath(".//div[@data-combo-value='direct-links']//textarea[@name='direct-links']")
            .within(results_panel())
    }
}

use selectors::*;

/// Stages of the upload workflow, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStep {
    Launch,
    NavigateToLogin,
    Authenticate,
    NavigateHome,
    LocateUploadAffordance,
    StageFiles,
    SelectAlbum,
    SubmitUpload,
    AwaitCompletion,
    SelectLinkFormat,
    ScrapeLinks,
}

impl UploadStep {
    pub const ALL: [UploadStep; 11] = [
        UploadStep::Launch,
        UploadStep::NavigateToLogin,
        UploadStep::Authenticate,
        UploadStep::NavigateHome,
        UploadStep::LocateUploadAffordance,
        UploadStep::StageFiles,
        UploadStep::SelectAlbum,
        UploadStep::SubmitUpload,
        UploadStep::AwaitCompletion,
        UploadStep::SelectLinkFormat,
        UploadStep::ScrapeLinks,
    ];
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStep::Launch => "launch",
            UploadStep::NavigateToLogin => "navigate to login",
            UploadStep::Authenticate => "authenticate",
            UploadStep::NavigateHome => "navigate home",
            UploadStep::LocateUploadAffordance => "locate upload button",
            UploadStep::StageFiles => "stage files",
            UploadStep::SelectAlbum => "select album",
            UploadStep::SubmitUpload => "submit upload",
            UploadStep::AwaitCompletion => "await completion",
            UploadStep::SelectLinkFormat => "select link format",
            UploadStep::ScrapeLinks => "scrape links",
        };
        f.write_str(name)
    }
}

/// An upload attempt that was aborted, and the step it was aborted at
#[derive(Error, Debug)]
#[error("Upload aborted at step '{step}': {source}")]
pub struct UploadError {
    pub step: UploadStep,
    #[source]
    pub source: BrowserError,
}

/// Run `f` as workflow step `step`, recording its timing.
fn step<T>(
    metrics: &mut RunMetrics,
    step: UploadStep,
    f: impl FnOnce() -> Result<T, BrowserError>,
) -> Result<T, UploadError> {
    tracing::debug!("Step: {}", step);
    let start = Instant::now();
    let result = f();
    metrics.record_step(step, start.elapsed(), result.is_ok());
    result.map_err(|source| UploadError { step, source })
}

/// Drives the imgbb.com UI through login, upload and link export.
///
/// One call to [`upload`](Self::upload) is one attempt: the first failing
/// step aborts it and nothing is retried.
#[derive(Debug, Clone)]
pub struct UploadService {
    timeouts: Timeouts,
    headless: bool,
    link_export_type: String,
}

impl UploadService {
    pub fn new(timeouts: Timeouts, headless: bool, link_export_type: impl Into<String>) -> Self {
        Self {
            timeouts,
            headless,
            link_export_type: link_export_type.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.timeouts,
            settings.headless_mode,
            settings.link_export_types.clone(),
        )
    }

    fn waiter(&self, timeout: Duration) -> Waiter {
        Waiter::new(timeout, self.timeouts.poll_interval())
    }

    fn element_waiter(&self) -> Waiter {
        self.waiter(self.timeouts.element())
    }

    /// Upload `files` into the configured album and return the scraped direct links.
    ///
    /// `launch` is called with the headless flag to start the browser. The
    /// browser is closed before this returns, whether the attempt succeeded
    /// or not.
    pub fn upload<B, F>(
        &self,
        launch: F,
        credentials: &Credentials,
        files: &[Utf8PathBuf],
        metrics: &mut RunMetrics,
    ) -> Result<Vec<String>, UploadError>
    where
        B: UiBackend,
        F: FnOnce(bool) -> Result<B, BrowserError>,
    {
        let result = step(metrics, UploadStep::Launch, || launch(self.headless)).and_then(|backend| {
            let mut session = BrowserSession::new(backend);
            self.drive(&mut *session, credentials, files, metrics)
        });

        match &result {
            Ok(links) => tracing::info!("Scraped {} direct link(s)", links.len()),
            Err(e) => tracing::error!("An error occurred: {}", e),
        }

        result
    }

    fn drive<B: UiBackend>(
        &self,
        ui: &mut B,
        credentials: &Credentials,
        files: &[Utf8PathBuf],
        metrics: &mut RunMetrics,
    ) -> Result<Vec<String>, UploadError> {
        step(metrics, UploadStep::NavigateToLogin, || ui.navigate(LOGIN_URL))?;
        step(metrics, UploadStep::Authenticate, || {
            self.authenticate(ui, credentials)
        })?;
        step(metrics, UploadStep::NavigateHome, || ui.navigate(HOME_URL))?;

        // Only waited on: staging goes through the file input directly
        step(metrics, UploadStep::LocateUploadAffordance, || {
            self.element_waiter()
                .until(&*ui, &Condition::Clickable(start_uploading_button()))
        })?;

        let mut staged = 0;
        let staging = step(metrics, UploadStep::StageFiles, || {
            self.stage_files(ui, files, &mut staged)
        });
        metrics.files_staged = staged;
        staging?;

        step(metrics, UploadStep::SelectAlbum, || {
            self.select_album(ui, &credentials.imgbb_album_id)
        })?;
        step(metrics, UploadStep::SubmitUpload, || self.submit_upload(ui))?;
        step(metrics, UploadStep::AwaitCompletion, || {
            self.waiter(self.timeouts.upload())
                .until(&*ui, &Condition::Visible(results_panel()))
        })?;
        step(metrics, UploadStep::SelectLinkFormat, || {
            self.select_link_format(ui)
        })?;
        step(metrics, UploadStep::ScrapeLinks, || self.scrape_links(ui))
    }

    fn authenticate<B: UiBackend>(
        &self,
        ui: &mut B,
        credentials: &Credentials,
    ) -> Result<(), BrowserError> {
        let waiter = self.element_waiter();

        waiter.until(&*ui, &Condition::Present(username_field()))?;
        waiter.until(&*ui, &Condition::Present(password_field()))?;
        ui.type_text(&username_field(), &credentials.imgbb_username)?;
        ui.type_text(&password_field(), &credentials.imgbb_password)?;

        waiter.until(&*ui, &Condition::Clickable(sign_in_button()))?;
        ui.click(&sign_in_button())?;

        waiter.until(
            &*ui,
            &Condition::UrlIs(landing_url(&credentials.imgbb_username)),
        )?;

        tracing::info!("Logged in as {}", credentials.imgbb_username);
        Ok(())
    }

    fn stage_files<B: UiBackend>(
        &self,
        ui: &mut B,
        files: &[Utf8PathBuf],
        staged: &mut usize,
    ) -> Result<(), BrowserError> {
        let waiter = self.element_waiter();
        let input = file_input();

        for file in files {
            waiter.until(&*ui, &Condition::Present(input.clone()))?;
            ui.attach_file(&input, file)?;
            *staged += 1;
            tracing::debug!("Staged {} ({}/{})", file, staged, files.len());

            // Give the page time to register the file; there is no event to wait on
            thread::sleep(self.timeouts.file_stage_delay());
        }

        tracing::info!("Staged {} file(s) for upload", staged);
        Ok(())
    }

    fn select_album<B: UiBackend>(&self, ui: &mut B, album_id: &str) -> Result<(), BrowserError> {
        let album = album_select();
        self.waiter(self.timeouts.album())
            .until(&*ui, &Condition::Visible(album.clone()))?;
        ui.select_by_value(&album, album_id)?;
        tracing::info!("Selected album {}", album_id);
        Ok(())
    }

    fn submit_upload<B: UiBackend>(&self, ui: &mut B) -> Result<(), BrowserError> {
        let button = upload_button();
        self.element_waiter()
            .until(&*ui, &Condition::Clickable(button.clone()))?;
        ui.click(&button)?;
        tracing::info!("Upload submitted, waiting for processing");
        Ok(())
    }

    fn select_link_format<B: UiBackend>(&self, ui: &mut B) -> Result<(), BrowserError> {
        let toggle = embed_toggle();
        self.element_waiter()
            .until(&*ui, &Condition::Present(toggle.clone()))?;
        ui.select_by_label(&toggle, &self.link_export_type)
    }

    fn scrape_links<B: UiBackend>(&self, ui: &mut B) -> Result<Vec<String>, BrowserError> {
        let textarea = direct_links_textarea();
        self.element_waiter()
            .until(&*ui, &Condition::Visible(textarea.clone()))?;
        let text = ui.read_value(&textarea)?;
        Ok(split_links(&text))
    }
}
