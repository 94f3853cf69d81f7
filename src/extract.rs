//! Store detail page -> `StoreRecord`.
//!
//! Extraction never fails once the extractor is built: every field that cannot be found
//! falls back to its documented default so one odd page does not sink a whole crawl.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::SiteSelectors;
use crate::error::{CrawlError, Result};
use crate::model::{MenuItem, MenuMap, StoreRecord};

/// Separator the site uses between the establishment type and the rest of the line.
const STORE_TYPE_DELIMITER: &str = "  ";

/// Compiled selectors for one site layout.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    store_name: Selector,
    store_type: Selector,
    location: Selector,
    rating: Selector,
    category: Selector,
    category_heading: Selector,
    item: Selector,
    item_name: Selector,
    item_price: Selector,
    currency_symbol: String,
}

impl RecordExtractor {
    pub fn new(selectors: &SiteSelectors) -> Result<Self> {
        Ok(Self {
            store_name: compile(&selectors.store_name)?,
            store_type: compile(&selectors.store_type)?,
            location: compile(&selectors.location)?,
            rating: compile(&selectors.rating)?,
            category: compile(&selectors.category)?,
            category_heading: compile(&selectors.category_heading)?,
            item: compile(&selectors.item)?,
            item_name: compile(&selectors.item_name)?,
            item_price: compile(&selectors.item_price)?,
            currency_symbol: selectors.currency_symbol.clone(),
        })
    }

    pub fn extract(&self, html: &str) -> StoreRecord {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let store_type = first_text(root, &self.store_type)
            .map(|text| leading_segment(&text).to_string())
            .unwrap_or_default();

        StoreRecord {
            name: first_text(root, &self.store_name).unwrap_or_default(),
            store_type,
            location: first_text(root, &self.location).unwrap_or_default(),
            rating: first_text(root, &self.rating).unwrap_or_default(),
            menu: self.extract_menu(root),
        }
    }

    fn extract_menu(&self, root: ElementRef<'_>) -> MenuMap {
        let mut menu = MenuMap::new();

        for (position, block) in root.select(&self.category).enumerate() {
            let Some(category_name) = first_text(block, &self.category_heading) else {
                warn!(block = position + 1, "Category block has no heading, skipping it");
                continue;
            };

            let items: Vec<MenuItem> = block
                .select(&self.item)
                .map(|section| self.extract_item(section))
                .collect();

            debug!(category = %category_name, items = items.len(), "Parsed menu category");
            if menu.insert(category_name.clone(), items).is_some() {
                debug!(category = %category_name, "Repeated category name, later block wins");
            }
        }

        menu
    }

    fn extract_item(&self, section: ElementRef<'_>) -> MenuItem {
        let name = first_text(section, &self.item_name)
            .unwrap_or_else(|| MenuItem::MISSING_NAME.to_string());
        let price = first_text(section, &self.item_price)
            .map(|raw| clean_price(&raw, &self.currency_symbol))
            .unwrap_or_else(|| MenuItem::MISSING_PRICE.to_string());

        MenuItem { name, price }
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| CrawlError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Trimmed text of the first descendant of `scope` matching `selector`.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

fn leading_segment(text: &str) -> &str {
    text.split(STORE_TYPE_DELIMITER).next().unwrap_or(text)
}

// Whitespace left between the symbol and the amount is dropped too, so "₹ 99" reads "99".
fn clean_price(raw: &str, currency_symbol: &str) -> String {
    if currency_symbol.is_empty() {
        return raw.trim().to_string();
    }
    raw.replace(currency_symbol, "").trim().to_string()
}
