use anyhow::Context;
use std::path::PathBuf;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::error::Result;
use crate::extract::RecordExtractor;
use crate::links::LinkEnumerator;
use crate::model::StoreRecord;
use crate::session::{ChromeSession, LaunchSettings, PageSession};
use crate::wait::WaitPolicy;
use crate::writer::write_records;

// ============================================================================
// Crawl pipeline
// ============================================================================

/// Listing page -> store links -> one record per store page, all in one sequential pass.
pub async fn crawl<S: PageSession + ?Sized>(
    session: &S,
    config: &CrawlConfig,
    extractor: &RecordExtractor,
    wait: &WaitPolicy,
) -> Result<Vec<StoreRecord>> {
    info!("🌐 Opening listing page: {}", config.url);
    session.navigate(&config.url)?;

    let settle = config.settle_delay();
    if !settle.is_zero() {
        info!("⏳ Letting the listing render for {}s...", settle.as_secs());
        sleep(settle).await;
    }
    wait.wait_until_clear(session).await;

    let links = LinkEnumerator::new(config.link_xpath.as_str(), config.max_stores).enumerate(session)?;
    Ok(scrape_stores(session, &links, extractor, wait).await)
}

/// Visits every link in order. A store whose page cannot be loaded is logged and left out.
pub async fn scrape_stores<S: PageSession + ?Sized>(
    session: &S,
    links: &[String],
    extractor: &RecordExtractor,
    wait: &WaitPolicy,
) -> Vec<StoreRecord> {
    let mut records = Vec::with_capacity(links.len());

    for (position, link) in links.iter().enumerate() {
        info!("🔍 [{}/{}] Scraping {}", position + 1, links.len(), link);
        match scrape_store(session, link, extractor, wait).await {
            Ok(record) => records.push(record),
            Err(e) => warn!("❌ Skipping {}: {}", link, e),
        }
    }

    info!("✅ Scraped {}/{} stores", records.len(), links.len());
    records
}

async fn scrape_store<S: PageSession + ?Sized>(
    session: &S,
    link: &str,
    extractor: &RecordExtractor,
    wait: &WaitPolicy,
) -> Result<StoreRecord> {
    session.navigate(link)?;
    wait.wait_until_clear(session).await;

    let html = session.current_markup()?;
    debug!("Fetched {} bytes of markup", html.len());

    let record = extractor.extract(&html);
    debug!(
        store = %record.name,
        categories = record.menu.len(),
        "Extracted store record"
    );
    Ok(record)
}

/// Full run against a real browser. Returns the path the results were written to.
pub async fn run(config: &CrawlConfig) -> anyhow::Result<PathBuf> {
    config.validate()?;
    let selectors = config.load_selectors()?;
    let extractor = RecordExtractor::new(&selectors)?;
    let wait = WaitPolicy::new(selectors.loading_indicator.as_str(), config.wait_timeout());

    let session = ChromeSession::launch(&LaunchSettings::from(config))
        .context("failed to launch Chrome")?;
    let outcome = crawl(&session, config, &extractor, &wait).await;
    session.quit();
    let records = outcome?;

    write_records(&config.output, &records)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    Ok(config.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteSelectors;
    use crate::error::CrawlError;
    use crate::session::mock::MockSession;
    use clap::Parser;
    use std::time::Duration;

    const LISTING: &str = "https://food.example/list/";
    const TEMPLATE: &str = "//section/article[{index}]/a";

    fn config() -> CrawlConfig {
        CrawlConfig::try_parse_from([
            "menu-crawler",
            "--url", LISTING,
            "--link-xpath", TEMPLATE,
            "--settle-secs", "0",
        ])
        .unwrap()
    }

    fn extractor() -> RecordExtractor {
        RecordExtractor::new(&SiteSelectors::default()).unwrap()
    }

    fn wait() -> WaitPolicy {
        WaitPolicy::new(".spinner", Duration::from_millis(50)).with_poll_interval(Duration::from_millis(5))
    }

    fn store_page(name: &str, dish: &str) -> String {
        format!(
            r#"<html><body>
                 <h1 class="v2">{}</h1>
                 <article class="categoryListing">
                   <h4 class="categoryHeading">Mains</h4>
                   <section class="categoryItemHolder">
                     <div class="itemDetails"><article class="itemInfo"><p class="itemName">{}</p></article></div>
                     <span class="itemPrice">₹199</span>
                   </section>
                 </article>
               </body></html>"#,
            name, dish
        )
    }

    fn xpath(index: usize) -> String {
        TEMPLATE.replace("{index}", &index.to_string())
    }

    #[tokio::test]
    async fn test_crawl_visits_links_in_listing_order() {
        let session = MockSession::default()
            .with_link(&xpath(1), "https://food.example/one/?src=list")
            .with_link(&xpath(2), "https://food.example/two/")
            .with_page("https://food.example/one/delivery/", &store_page("One", "Thali"))
            .with_page("https://food.example/two/delivery/", &store_page("Two", "Biryani"));

        let records = crawl(&session, &config(), &extractor(), &wait()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "One");
        assert_eq!(records[0].menu["Mains"][0].name, "Thali");
        assert_eq!(records[0].menu["Mains"][0].price, "199");
        assert_eq!(records[1].name, "Two");
        assert_eq!(
            *session.visited.borrow(),
            vec![
                LISTING.to_string(),
                "https://food.example/one/delivery/".to_string(),
                "https://food.example/two/delivery/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_store_page_is_skipped() {
        let session = MockSession::default()
            .with_link(&xpath(1), "https://food.example/one/")
            .with_link(&xpath(2), "https://food.example/broken/")
            .with_link(&xpath(3), "https://food.example/three/")
            .with_page("https://food.example/one/delivery/", &store_page("One", "Dosa"))
            .with_page("https://food.example/three/delivery/", &store_page("Three", "Idli"))
            .failing("https://food.example/broken/delivery/");

        let records = crawl(&session, &config(), &extractor(), &wait()).await.unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Three"]);
        assert_eq!(session.visited.borrow().len(), 4);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_crawl() {
        let session = MockSession::default().failing(LISTING);
        let err = crawl(&session, &config(), &extractor(), &wait()).await.unwrap_err();
        assert!(matches!(err, CrawlError::Browser(_)));
    }

    #[tokio::test]
    async fn test_stuck_spinner_does_not_stop_crawl() {
        let session = MockSession::default()
            .with_link(&xpath(1), "https://food.example/slow/")
            .with_page("https://food.example/slow/delivery/", &store_page("Slow", "Paratha"));
        session.indicator_checks.set(usize::MAX);

        let records = crawl(&session, &config(), &extractor(), &wait()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Slow");
    }

    #[tokio::test]
    async fn test_empty_listing_yields_no_records() {
        let session = MockSession::default();
        let records = crawl(&session, &config(), &extractor(), &wait()).await.unwrap();
        assert!(records.is_empty());
    }
}
