//! [`UiBackend`] over a local Chrome/Chromium driven through `headless_chrome`.

use super::{BrowserError, Locator, UiBackend};
use camino::Utf8Path;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// The browser is killed if no DevTools traffic is seen for this long.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

const IS_VISIBLE_JS: &str = r#"function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return style.display !== 'none' && style.visibility !== 'hidden'
        && rect.width > 0 && rect.height > 0;
}"#;

const IS_CLICKABLE_JS: &str = r#"function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return style.display !== 'none' && style.visibility !== 'hidden'
        && rect.width > 0 && rect.height > 0 && !this.disabled;
}"#;

const SELECT_BY_VALUE_JS: &str = r#"function(wanted) {
    const option = Array.from(this.options).find(o => o.value === wanted);
    if (!option) { return false; }
    this.value = option.value;
    this.dispatchEvent(new Event('change', { bubbles: true }));
    return true;
}"#;

const SELECT_BY_LABEL_JS: &str = r#"function(wanted) {
    const normalize = s => s.replace(/\s+/g, ' ').trim();
    const option = Array.from(this.options).find(o => normalize(o.text) === normalize(wanted));
    if (!option) { return false; }
    this.value = option.value;
    this.dispatchEvent(new Event('change', { bubbles: true }));
    return true;
}"#;

const READ_VALUE_JS: &str = "function() { return this.value; }";

fn backend_error(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Backend(e.to_string())
}

pub struct ChromeBackend {
    // Dropping the Browser kills the Chrome process
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromeBackend {
    /// Start Chrome, headless or with a visible window, and open a tab.
    pub fn launch(headless: bool) -> Result<Self, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| BrowserError::Launch(format!("{:#}", e)))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Launch(format!("{:#}", e)))?;

        tracing::info!("Launched Chrome (headless={})", headless);

        Ok(Self {
            browser: Some(browser),
            tab,
        })
    }

    fn element(&self, locator: &Locator) -> Result<Element<'_>, BrowserError> {
        self.tab
            .find_element_by_xpath(&locator.to_xpath())
            .map_err(|_| BrowserError::ElementNotFound(locator.clone()))
    }

    fn call_js(
        &self,
        locator: &Locator,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Option<Value>, BrowserError> {
        let element = self.element(locator)?;
        let result = element
            .call_js_fn(function, args, false)
            .map_err(|e| BrowserError::Script {
                locator: locator.clone(),
                message: format!("{:#}", e),
            })?;
        Ok(result.value)
    }

    fn call_js_bool(&self, locator: &Locator, function: &str, args: Vec<Value>) -> Result<bool, BrowserError> {
        Ok(self
            .call_js(locator, function, args)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

impl UiBackend for ChromeBackend {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        tracing::info!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| backend_error(format!("{:#}", e)))?;
        Ok(())
    }

    fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.tab.get_url())
    }

    fn is_present(&self, locator: &Locator) -> Result<bool, BrowserError> {
        Ok(self.element(locator).is_ok())
    }

    fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.call_js_bool(locator, IS_VISIBLE_JS, Vec::new())
    }

    fn is_clickable(&self, locator: &Locator) -> Result<bool, BrowserError> {
        self.call_js_bool(locator, IS_CLICKABLE_JS, Vec::new())
    }

    fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), BrowserError> {
        self.element(locator)?
            .type_into(text)
            .map_err(|e| backend_error(format!("{:#}", e)))?;
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        tracing::debug!("Clicking {}", locator);
        self.element(locator)?
            .click()
            .map_err(|e| backend_error(format!("{:#}", e)))?;
        Ok(())
    }

    fn attach_file(&mut self, locator: &Locator, path: &Utf8Path) -> Result<(), BrowserError> {
        // Chrome resolves relative paths against its own working directory
        let absolute = std::path::absolute(path.as_std_path()).map_err(backend_error)?;
        let absolute = absolute
            .to_str()
            .ok_or_else(|| backend_error(format!("Non UTF-8 path: {}", absolute.display())))?;

        self.element(locator)?
            .set_input_files(&[absolute])
            .map_err(|e| backend_error(format!("{:#}", e)))?;
        Ok(())
    }

    fn select_by_value(&mut self, locator: &Locator, value: &str) -> Result<(), BrowserError> {
        if self.call_js_bool(locator, SELECT_BY_VALUE_JS, vec![json!(value)])? {
            Ok(())
        } else {
            Err(BrowserError::OptionNotFound {
                locator: locator.clone(),
                option: value.to_string(),
            })
        }
    }

    fn select_by_label(&mut self, locator: &Locator, label: &str) -> Result<(), BrowserError> {
        if self.call_js_bool(locator, SELECT_BY_LABEL_JS, vec![json!(label)])? {
            Ok(())
        } else {
            Err(BrowserError::OptionNotFound {
                locator: locator.clone(),
                option: label.to_string(),
            })
        }
    }

    fn read_value(&self, locator: &Locator) -> Result<String, BrowserError> {
        match self.call_js(locator, READ_VALUE_JS, Vec::new())? {
            Some(Value::String(value)) => Ok(value),
            Some(Value::Null) | None => Ok(String::new()),
            Some(other) => Ok(other.to_string()),
        }
    }

    fn close(&mut self) {
        if let Err(e) = self.tab.close(true) {
            tracing::debug!("Tab close failed, killing browser anyway: {:#}", e);
        }
        if self.browser.take().is_some() {
            tracing::info!("Browser closed");
        }
    }
}
