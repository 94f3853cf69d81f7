pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod links;
pub mod logger;
pub mod model;
pub mod session;
pub mod wait;
pub mod writer;

pub use config::{CrawlConfig, SiteSelectors};
pub use error::{CrawlError, Result};
pub use extract::RecordExtractor;
pub use model::{MenuItem, MenuMap, StoreRecord};
pub use session::{ChromeSession, PageElement, PageSession};
