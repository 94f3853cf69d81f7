use clap::Parser;
use dotenv::dotenv;
use menu_crawler::{crawler, logger, CrawlConfig};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = CrawlConfig::parse();
    logger::init_logger(config.verbose);

    tracing::info!("Starting menu-crawler");
    tracing::debug!("Config: {:?}", config);

    match crawler::run(&config).await {
        Ok(path) => {
            println!("Data has been successfully stored in '{}'.", path.display());
        }
        Err(e) => {
            tracing::error!("❌ Crawl failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}
