//! Scrape a single store page and print the record, for checking selectors
//! against a live page or a saved copy of one.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::time::Duration;

use menu_crawler::session::{ChromeSession, LaunchSettings, PageSession};
use menu_crawler::wait::WaitPolicy;
use menu_crawler::{logger, RecordExtractor, SiteSelectors};

#[derive(Parser, Debug)]
#[command(name = "inspect_page", about = "Extract one store page and print it as JSON")]
struct InspectArgs {
    /// Detail page URL, or path to a saved HTML file
    target: String,

    /// TOML file overriding the built-in page selectors
    #[arg(long, env = "SELECTORS_FILE")]
    selectors: Option<PathBuf>,

    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    #[arg(long)]
    headed: bool,

    #[arg(long, default_value_t = 10)]
    wait_timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = InspectArgs::parse();
    logger::init_logger(args.verbose);

    let selectors = match &args.selectors {
        Some(path) => SiteSelectors::from_file(path)?,
        None => SiteSelectors::default(),
    };
    let extractor = RecordExtractor::new(&selectors)?;

    let html = if Path::new(&args.target).is_file() {
        println!("📄 Reading saved page {}", args.target);
        std::fs::read_to_string(&args.target)
            .with_context(|| format!("failed to read {}", args.target))?
    } else {
        println!("🕵️ Loading {} in Chrome...", args.target);
        let session = ChromeSession::launch(&LaunchSettings {
            headless: !args.headed,
            chrome_path: args.chrome_path.clone(),
            ..Default::default()
        })?;
        let wait = WaitPolicy::new(
            selectors.loading_indicator.as_str(),
            Duration::from_secs(args.wait_timeout_secs),
        );

        let markup = match session.navigate(&args.target) {
            Ok(()) => {
                let outcome = wait.wait_until_clear(&session).await;
                println!("Wait outcome: {:?}", outcome);
                session.current_markup()
            }
            Err(e) => Err(e),
        };
        session.quit();
        markup?
    };
    println!("Page size: {} bytes", html.len());

    let record = extractor.extract(&html);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
