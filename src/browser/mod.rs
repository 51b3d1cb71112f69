//! Browser automation seam.
//!
//! The upload workflow talks to the page only through the [`UiBackend`] trait,
//! addressing elements by [`Locator`] and waiting on named [`Condition`]s with
//! a bounded [`Waiter`]. The real implementation is [`ChromeBackend`]; tests
//! substitute scripted fakes.
//!
//! A backend is owned by a [`BrowserSession`] for its whole life. Dropping the
//! session closes the backend, so the browser is released on every exit path.

pub mod chrome;

pub use chrome::ChromeBackend;

use camino::Utf8Path;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors raised by a [`UiBackend`] or while waiting on it
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Element not found: {0}")]
    ElementNotFound(Locator),

    #[error("Timed out after {timeout:?} waiting for {condition}")]
    Timeout { condition: String, timeout: Duration },

    #[error("No option {option:?} in {locator}")]
    OptionNotFound { locator: Locator, option: String },

    #[error("Script failed on {locator}: {message}")]
    Script { locator: Locator, message: String },

    #[error("Browser error: {0}")]
    Backend(String),
}

/// How to find an element on the page.
///
/// Every locator lowers to an XPath expression via [`Locator::to_xpath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Name(String),
    Id(String),
    Class(String),
    XPath(String),
    /// `child` searched only inside `parent`
    Within {
        parent: Box<Locator>,
        child: Box<Locator>,
    },
}

impl Locator {
    pub fn name(name: impl Into<String>) -> Self {
        Locator::Name(name.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn class(class: impl Into<String>) -> Self {
        Locator::Class(class.into())
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Locator::XPath(xpath.into())
    }

    /// Scope this locator to descendants of `parent`.
    pub fn within(self, parent: Locator) -> Self {
        Locator::Within {
            parent: Box::new(parent),
            child: Box::new(self),
        }
    }

    pub fn to_xpath(&self) -> String {
        match self {
            Locator::Name(name) => format!("//*[@name={}]", xpath_literal(name)),
            Locator::Id(id) => format!("//*[@id={}]", xpath_literal(id)),
            Locator::Class(class) => format!(
                "//*[contains(concat(' ', normalize-space(@class), ' '), {})]",
                xpath_literal(&format!(" {} ", class))
            ),
            Locator::XPath(xpath) => xpath.clone(),
            Locator::Within { parent, child } => {
                let child = child.to_xpath();
                // ".//x" and "//x" both mean "any descendant" once appended to the parent
                let relative = child.strip_prefix('.').unwrap_or(&child);
                if relative.starts_with('/') {
                    format!("{}{}", parent.to_xpath(), relative)
                } else {
                    format!("{}//{}", parent.to_xpath(), relative)
                }
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Name(name) => write!(f, "name={}", name),
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::Class(class) => write!(f, "class={}", class),
            Locator::XPath(xpath) => write!(f, "xpath={}", xpath),
            Locator::Within { parent, child } => write!(f, "{} within {}", child, parent),
        }
    }
}

/// Quote `value` as an XPath 1.0 string literal.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Page interactions needed by the upload workflow.
///
/// Query methods may fail when the element does not exist yet; [`Waiter`]
/// treats such failures as "condition not met".
pub trait UiBackend {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    fn current_url(&self) -> Result<String, BrowserError>;

    fn is_present(&self, locator: &Locator) -> Result<bool, BrowserError>;

    fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError>;

    /// Visible and enabled
    fn is_clickable(&self, locator: &Locator) -> Result<bool, BrowserError>;

    fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), BrowserError>;

    fn click(&mut self, locator: &Locator) -> Result<(), BrowserError>;

    /// Hand a local file to an `<input type="file">`.
    fn attach_file(&mut self, locator: &Locator, path: &Utf8Path) -> Result<(), BrowserError>;

    /// Pick the `<option>` of a `<select>` whose `value` equals `value`.
    fn select_by_value(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError>;

    /// Pick the `<option>` of a `<select>` whose visible text equals `label`.
    fn select_by_label(&mut self, locator: &Locator, label: &str) -> Result<(), BrowserError>;

    /// Current `value` of a form control.
    fn read_value(&self, locator: &Locator) -> Result<String, BrowserError>;

    /// Shut the browser down. Called once, by [`BrowserSession`].
    fn close(&mut self);
}

/// Something a [`Waiter`] can poll for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Present(Locator),
    Visible(Locator),
    Clickable(Locator),
    UrlIs(String),
}

impl Condition {
    pub fn holds<B: UiBackend + ?Sized>(&self, backend: &B) -> Result<bool, BrowserError> {
        match self {
            Condition::Present(locator) => backend.is_present(locator),
            Condition::Visible(locator) => backend.is_visible(locator),
            Condition::Clickable(locator) => backend.is_clickable(locator),
            Condition::UrlIs(url) => Ok(backend.current_url()? == *url),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present(locator) => write!(f, "presence of {}", locator),
            Condition::Visible(locator) => write!(f, "visibility of {}", locator),
            Condition::Clickable(locator) => write!(f, "{} to be clickable", locator),
            Condition::UrlIs(url) => write!(f, "url to be {}", url),
        }
    }
}

/// Bounded polling for a [`Condition`].
///
/// The condition is always checked at least once, then re-checked every
/// `poll_interval` until it holds or `timeout` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn until<B: UiBackend + ?Sized>(
        &self,
        backend: &B,
        condition: &Condition,
    ) -> Result<(), BrowserError> {
        let start = Instant::now();

        loop {
            match condition.holds(backend) {
                Ok(true) => {
                    tracing::debug!(
                        "Condition met after {:.2}s: {}",
                        start.elapsed().as_secs_f32(),
                        condition
                    );
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => tracing::trace!("Condition not met yet ({}): {}", condition, e),
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                tracing::warn!("Timed out after {:?} waiting for {}", self.timeout, condition);
                return Err(BrowserError::Timeout {
                    condition: condition.to_string(),
                    timeout: self.timeout,
                });
            }

            thread::sleep(self.poll_interval.min(self.timeout - elapsed));
        }
    }
}

/// Exclusive owner of a [`UiBackend`]; closes it when dropped.
pub struct BrowserSession<B: UiBackend> {
    backend: B,
}

impl<B: UiBackend> BrowserSession<B> {
    pub fn new(backend: B) -> Self {
        tracing::debug!("Browser session opened");
        Self { backend }
    }
}

impl<B: UiBackend> Deref for BrowserSession<B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.backend
    }
}

impl<B: UiBackend> DerefMut for BrowserSession<B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: UiBackend> Drop for BrowserSession<B> {
    fn drop(&mut self) {
        tracing::debug!("Closing browser session");
        self.backend.close();
    }
}
