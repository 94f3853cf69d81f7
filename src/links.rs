//! Store link discovery on the listing page.
//!
//! The listing exposes no entry count, so entries are probed by position until one is
//! missing. The walk is capped at `max_entries` in case the layout ever changes so that
//! the template matches forever.

use tracing::{debug, info, warn};
use url::Url;

use crate::config::INDEX_PLACEHOLDER;
use crate::error::Result;
use crate::session::{PageElement, PageSession};

/// Appended to a store URL to land on its delivery menu.
pub const DETAIL_SUFFIX: &str = "delivery/";

/// Result of looking up one listing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Hit(PageElement),
    Miss,
}

#[derive(Debug, Clone)]
pub struct LinkEnumerator {
    template: String,
    max_entries: usize,
}

impl LinkEnumerator {
    pub fn new(template: impl Into<String>, max_entries: usize) -> Self {
        Self {
            template: template.into(),
            max_entries,
        }
    }

    pub fn xpath_for(&self, index: usize) -> String {
        self.template.replace(INDEX_PLACEHOLDER, &index.to_string())
    }

    pub fn probe<S: PageSession + ?Sized>(&self, session: &S, index: usize) -> Result<Probe> {
        Ok(match session.find(&self.xpath_for(index))? {
            Some(element) => Probe::Hit(element),
            None => Probe::Miss,
        })
    }

    /// Detail-page links in listing order.
    pub fn enumerate<S: PageSession + ?Sized>(&self, session: &S) -> Result<Vec<String>> {
        let base_url = session.current_url();
        let mut links = Vec::new();

        for index in 1..=self.max_entries {
            let element = match self.probe(session, index)? {
                Probe::Hit(element) => element,
                Probe::Miss => {
                    debug!(index, "No listing entry at position, enumeration done");
                    info!("🔗 Found {} store links", links.len());
                    return Ok(links);
                }
            };

            match element.attribute("href") {
                Some(href) => links.push(detail_link(&resolve_href(&base_url, href))),
                None => warn!(index, "Listing entry has no href, skipping it"),
            }
        }

        warn!(
            "⚠️ Stopped after {} listing entries without reaching the end of the list",
            self.max_entries
        );
        Ok(links)
    }
}

/// Drops the query string and points the link at the delivery menu.
pub fn detail_link(href: &str) -> String {
    let without_query = href.split('?').next().unwrap_or(href);
    format!("{}{}", without_query, DETAIL_SUFFIX)
}

fn resolve_href(base_url: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::MockSession;

    const TEMPLATE: &str = "//main/article[{index}]/div[1]/div/a";

    fn enumerator() -> LinkEnumerator {
        LinkEnumerator::new(TEMPLATE, 100)
    }

    #[test]
    fn test_detail_link_strips_query() {
        assert_eq!(detail_link("https://site/x?ref=1"), "https://site/xdelivery/");
        assert_eq!(detail_link("https://site/store/"), "https://site/store/delivery/");
        assert_eq!(detail_link("https://site/x?a=1?b=2"), "https://site/xdelivery/");
    }

    #[test]
    fn test_xpath_for_substitutes_index() {
        assert_eq!(enumerator().xpath_for(7), "//main/article[7]/div[1]/div/a");
    }

    #[test]
    fn test_stops_at_first_missing_index() {
        let e = enumerator();
        let session = MockSession::default()
            .with_link(&e.xpath_for(1), "https://magicpin.in/a/?utm=1")
            .with_link(&e.xpath_for(2), "https://magicpin.in/b/")
            .with_link(&e.xpath_for(3), "https://magicpin.in/c/?x=y")
            .with_link(&e.xpath_for(5), "https://magicpin.in/unreachable/");

        let links = e.enumerate(&session).unwrap();
        assert_eq!(
            links,
            vec![
                "https://magicpin.in/a/delivery/",
                "https://magicpin.in/b/delivery/",
                "https://magicpin.in/c/delivery/",
            ]
        );
        assert_eq!(session.probes.borrow().len(), 4);
    }

    #[test]
    fn test_empty_listing() {
        let session = MockSession::default();
        assert!(enumerator().enumerate(&session).unwrap().is_empty());
    }

    #[test]
    fn test_bounded_by_max_entries() {
        let e = LinkEnumerator::new(TEMPLATE, 2);
        let mut session = MockSession::default();
        for index in 1..=5 {
            session = session.with_link(&e.xpath_for(index), &format!("https://site/{}", index));
        }
        let links = e.enumerate(&session).unwrap();
        assert_eq!(links, vec!["https://site/1delivery/", "https://site/2delivery/"]);
        assert_eq!(session.probes.borrow().len(), 2);
    }

    #[test]
    fn test_entry_without_href_is_skipped() {
        let e = enumerator();
        let session = MockSession::default()
            .with_link(&e.xpath_for(1), "https://site/one")
            .with_element(&e.xpath_for(2), PageElement::default().with_attribute("class", "ad"))
            .with_link(&e.xpath_for(3), "https://site/three");

        let links = e.enumerate(&session).unwrap();
        assert_eq!(links, vec!["https://site/onedelivery/", "https://site/threedelivery/"]);
    }

    #[test]
    fn test_relative_href_resolved_against_listing() {
        let e = enumerator();
        let session = MockSession::default().with_link(&e.xpath_for(1), "/new-delhi/cafe/store/?ref=list");
        *session.current.borrow_mut() = "https://magicpin.in/india/New-Delhi/All/Restaurant/".to_string();

        let links = e.enumerate(&session).unwrap();
        assert_eq!(links, vec!["https://magicpin.in/new-delhi/cafe/store/delivery/"]);
    }

    #[test]
    fn test_probe_reports_miss() {
        let session = MockSession::default();
        assert_eq!(enumerator().probe(&session, 1).unwrap(), Probe::Miss);
    }
}
