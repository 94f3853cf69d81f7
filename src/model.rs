use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category name to the items listed under it. Categories keep the order they first
/// appear on the page; items keep page order.
pub type MenuMap = IndexMap<String, Vec<MenuItem>>;

/// One store scraped from a detail page.
///
/// Text fields are empty strings when the page did not carry them.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct StoreRecord {
    #[serde(rename = "store_name")]
    pub name: String,
    pub store_type: String,
    pub location: String,
    pub rating: String,
    pub menu: MenuMap,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    pub price: String,
}

impl MenuItem {
    pub const MISSING_NAME: &'static str = "N/A";
    pub const MISSING_PRICE: &'static str = "0";
}
