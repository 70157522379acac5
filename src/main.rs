mod config;
mod error;
mod heuristics;
mod models;
mod pipeline;
mod reconcile;
mod scrapers;
mod storage;
#[cfg(test)]
mod testing;

use anyhow::{bail, Context};
use config::Config;
use models::ListingStatus;
use scrapers::{CraigslistScraper, ReqwestFetcher};
use storage::{ListingStore, SheetsStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: rental-scout [scrape | report | status <listing_id> <new|love|nope>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let store = SheetsStore::new(
        &config.service_account_json,
        &config.sheet_id,
        &config.sheet_name,
        config.fetch_timeout,
    )?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("scrape") => scrape(&config, &store).await,
        Some("report") => report(&store).await,
        Some("status") => {
            let (Some(listing_id), Some(status)) = (args.get(1), args.get(2)) else {
                bail!(USAGE);
            };
            let status: ListingStatus = status.parse()?;
            if !store.set_status(listing_id, status).await? {
                bail!("Listing {} not found", listing_id);
            }
            info!("{} marked {}", listing_id, status.as_str());
            Ok(())
        }
        Some(_) => bail!(USAGE),
    }
}

async fn scrape(config: &Config, store: &SheetsStore) -> anyhow::Result<()> {
    info!("🏠 Rental Scout - Craigslist scraper");

    let fetcher = ReqwestFetcher::new(config.fetch_timeout)?;
    let scraper = CraigslistScraper::new(&fetcher, &config.search);

    let summary = pipeline::run_scrape(&scraper, &fetcher, store, &config.search).await?;

    println!("{}", serde_json::to_string_pretty(&summary).context("Failed to render summary")?);

    if summary.looks_blocked() {
        warn!("No listings fetched. Source may be blocking requests.");
    }

    Ok(())
}

async fn report(store: &SheetsStore) -> anyhow::Result<()> {
    let rows = store.read_rows().await?;
    let groups = reconcile::group_rows(&rows);

    for (status, buckets) in &groups {
        println!("{}", status.as_str().to_uppercase());
        for (bucket, cities) in buckets {
            println!("  {}", bucket);
            for (city, listings) in cities {
                println!("    {}: {}", city, listings.len());
                for row in listings {
                    println!(
                        "      ${} · {} · {}",
                        row.cell(models::Column::Price),
                        row.cell(models::Column::Address),
                        row.url()
                    );
                }
            }
        }
    }

    info!("{} stored listings", rows.len());
    Ok(())
}
