//! Browser session handling.
//!
//! The crawl only needs a handful of page operations, so they sit behind `PageSession`.
//! `ChromeSession` drives a real Chrome through `headless_chrome`; tests use an in-memory
//! page instead.

use headless_chrome::{Browser, LaunchOptions, Tab};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};

/// Page operations the crawler relies on.
pub trait PageSession {
    /// Load `url` and block until navigation has finished.
    fn navigate(&self, url: &str) -> Result<()>;

    fn current_url(&self) -> String;

    /// Serialized DOM of the current page.
    fn current_markup(&self) -> Result<String>;

    /// First element matching `xpath`, or `None` when nothing matches.
    fn find(&self, xpath: &str) -> Result<Option<PageElement>>;

    /// Whether any element matches the CSS selector right now.
    fn is_present(&self, css: &str) -> Result<bool>;
}

/// Snapshot of a live element's attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageElement {
    attributes: HashMap<String, String>,
}

impl PageElement {
    pub fn new(attributes: HashMap<String, String>) -> Self {
        Self { attributes }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

// `href` is read from the DOM property so relative links come back absolute.
const FIND_BY_XPATH_JS: &str = r#"
    (() => {
        const node = document.evaluate(__XPATH__, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
        if (!node || !node.attributes) return null;
        const attributes = {};
        for (const attr of node.attributes) attributes[attr.name] = attr.value;
        if (typeof node.href === 'string') attributes.href = node.href;
        return JSON.stringify(attributes);
    })()
"#;

const IS_PRESENT_JS: &str = "document.querySelector(__SELECTOR__) !== null";

/// How to start Chrome.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    /// How long the DevTools connection may stay silent before it is dropped
    pub idle_timeout: Duration,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

impl From<&CrawlConfig> for LaunchSettings {
    fn from(config: &CrawlConfig) -> Self {
        // The listing settle delay can be long and quiet; don't let the
        // websocket idle out underneath it.
        Self {
            headless: !config.headed,
            chrome_path: config.chrome_path.clone(),
            idle_timeout: config.settle_delay() + config.wait_timeout() + Duration::from_secs(300),
        }
    }
}

/// A Chrome instance with a single tab, owned for the whole crawl.
///
/// The browser process is killed when the session is dropped, so every exit path
/// releases it; `quit` just makes the release explicit.
pub struct ChromeSession {
    // Held so the process lives as long as the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    pub fn launch(settings: &LaunchSettings) -> Result<Self> {
        let args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-infobars"),
            OsStr::new("--window-position=0,0"),
        ];

        info!(headless = settings.headless, "Launching Chrome");
        let browser = Browser::new(LaunchOptions {
            headless: settings.headless,
            window_size: Some((1920, 1080)),
            path: settings.chrome_path.clone(),
            idle_browser_timeout: settings.idle_timeout,
            args,
            ..Default::default()
        })
        .map_err(CrawlError::browser)?;

        let tab = browser.new_tab().map_err(CrawlError::browser)?;
        tab.set_default_timeout(Duration::from_secs(60));

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    pub fn quit(self) {
        if let Err(e) = self.tab.close(true) {
            warn!("Failed to close tab cleanly: {}", e);
        }
        debug!("Chrome session closed");
    }
}

impl PageSession for ChromeSession {
    fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        self.tab.navigate_to(url).map_err(CrawlError::browser)?;
        self.tab.wait_until_navigated().map_err(CrawlError::browser)?;
        Ok(())
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn current_markup(&self) -> Result<String> {
        self.tab.get_content().map_err(CrawlError::browser)
    }

    fn find(&self, xpath: &str) -> Result<Option<PageElement>> {
        let script = FIND_BY_XPATH_JS.replace("__XPATH__", &serde_json::to_string(xpath)?);
        let result = self.tab.evaluate(&script, false).map_err(CrawlError::browser)?;

        match result.value {
            Some(serde_json::Value::String(json)) => {
                let attributes: HashMap<String, String> = serde_json::from_str(&json)?;
                Ok(Some(PageElement::new(attributes)))
            }
            _ => Ok(None),
        }
    }

    fn is_present(&self, css: &str) -> Result<bool> {
        let script = IS_PRESENT_JS.replace("__SELECTOR__", &serde_json::to_string(css)?);
        let result = self.tab.evaluate(&script, false).map_err(CrawlError::browser)?;
        Ok(matches!(result.value, Some(serde_json::Value::Bool(true))))
    }
}
