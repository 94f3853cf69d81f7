//! Runtime configuration.
//!
//! Everything site-specific lives here: the listing URL, the positional XPath used to
//! enumerate store links and the CSS selectors used to read a detail page. Values come
//! from CLI flags, falling back to environment variables (a `.env` file is honoured).

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CrawlError, Result};

pub const DEFAULT_LISTING_URL: &str = "https://magicpin.in/india/New-Delhi/All/Restaurant/?sort=max_save_percent%3Adesc%3Adist&filter=all_stores&filter=city%3ANew+Delhi";

pub const DEFAULT_LINK_XPATH: &str =
    r#"//*[@id="react-around-search-results"]/main/section/div[1]/article[{index}]/div[1]/div/a"#;

/// Placeholder substituted with the 1-based entry position in the link template.
pub const INDEX_PLACEHOLDER: &str = "{index}";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "menu-crawler",
    version,
    about = "Crawl a food-delivery listing and scrape every store's menu to JSON"
)]
pub struct CrawlConfig {
    /// Listing page to start from
    #[arg(long, env = "CRAWL_URL", default_value = DEFAULT_LISTING_URL)]
    pub url: String,

    /// XPath of a listing entry's link; `{index}` is replaced by the entry position
    #[arg(long, env = "LINK_XPATH", default_value = DEFAULT_LINK_XPATH)]
    pub link_xpath: String,

    /// Where to write the JSON output
    #[arg(short, long, env = "OUTPUT_PATH", default_value = "stores.json")]
    pub output: PathBuf,

    /// TOML file overriding the built-in page selectors
    #[arg(long, env = "SELECTORS_FILE")]
    pub selectors: Option<PathBuf>,

    /// Chrome/Chromium executable (auto-detected when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long, env = "CRAWL_HEADED")]
    pub headed: bool,

    /// Seconds to let the listing page render before looking for links
    #[arg(long, env = "SETTLE_SECS", default_value_t = 60)]
    pub settle_secs: u64,

    /// Upper bound on waiting for the loading spinner to disappear
    #[arg(long, env = "WAIT_TIMEOUT_SECS", default_value_t = 10)]
    pub wait_timeout_secs: u64,

    /// Stop enumerating listing entries after this many
    #[arg(long, env = "MAX_STORES", default_value_t = 10_000)]
    pub max_stores: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(CrawlError::config("listing URL must not be empty"));
        }
        if !self.link_xpath.contains(INDEX_PLACEHOLDER) {
            return Err(CrawlError::config(format!(
                "link XPath must contain the {} placeholder: {}",
                INDEX_PLACEHOLDER, self.link_xpath
            )));
        }
        if self.wait_timeout_secs == 0 {
            return Err(CrawlError::config("wait timeout must be at least one second"));
        }
        if self.max_stores == 0 {
            return Err(CrawlError::config("max stores must be at least 1"));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    /// Built-in selectors, overlaid with the selectors file when one is configured.
    pub fn load_selectors(&self) -> Result<SiteSelectors> {
        match &self.selectors {
            Some(path) => SiteSelectors::from_file(path),
            None => Ok(SiteSelectors::default()),
        }
    }
}

/// CSS selectors describing a store detail page.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteSelectors {
    pub store_name: String,
    pub store_type: String,
    pub location: String,
    pub rating: String,
    /// One block per menu category
    pub category: String,
    /// Heading inside a category block
    pub category_heading: String,
    /// One section per item inside a category block
    pub item: String,
    pub item_name: String,
    pub item_price: String,
    /// Glyph removed from prices
    pub currency_symbol: String,
    /// Spinner shown while the page is still fetching data
    pub loading_indicator: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            store_name: "h1.v2".to_string(),
            store_type: "p.merchant-establishment.hide-mb".to_string(),
            location: "a.merchant-locality".to_string(),
            rating: "p.rating-desc".to_string(),
            category: "article.categoryListing".to_string(),
            category_heading: "h4.categoryHeading".to_string(),
            item: "section.categoryItemHolder".to_string(),
            item_name: "div.itemDetails article.itemInfo p.itemName".to_string(),
            item_price: "span.itemPrice".to_string(),
            currency_symbol: "₹".to_string(),
            loading_indicator: ".MuiCircularProgress-root".to_string(),
        }
    }
}

impl SiteSelectors {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CrawlError::config(format!("invalid selectors file: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrawlError::config(format!("cannot read selectors file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }
}
