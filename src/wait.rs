use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::session::PageSession;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How a wait for the loading indicator ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Cleared,
    TimedOut,
    Failed(String),
}

/// Best-effort wait for a loading indicator to leave the page.
///
/// Never fails the crawl: a page that is still spinning after the timeout is
/// usually readable anyway, so the outcome is only logged.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    indicator: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl WaitPolicy {
    pub fn new(indicator: impl Into<String>, timeout: Duration) -> Self {
        Self {
            indicator: indicator.into(),
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub async fn wait_until_clear<S: PageSession + ?Sized>(&self, session: &S) -> WaitOutcome {
        let deadline = Instant::now() + self.timeout;

        loop {
            match session.is_present(&self.indicator) {
                Ok(false) => {
                    debug!(indicator = %self.indicator, "Loading indicator gone");
                    return WaitOutcome::Cleared;
                }
                Ok(true) => {}
                Err(e) => {
                    warn!("⚠️ Waiting for loading indicator failed: {}. Continuing anyway...", e);
                    return WaitOutcome::Failed(e.to_string());
                }
            }

            if Instant::now() >= deadline {
                warn!(
                    "⚠️ Loading indicator still present after {:?}. Continuing anyway...",
                    self.timeout
                );
                return WaitOutcome::TimedOut;
            }
            sleep(self.poll_interval).await;
        }
    }
}
