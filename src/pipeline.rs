use crate::models::{BackfillCandidate, Column, Listing, RunSummary};
use crate::reconcile::{dedupe_listings, new_listings};
use crate::scrapers::detail::DetailEnricher;
use crate::scrapers::traits::{HtmlFetcher, ScraperTrait};
use crate::scrapers::types::SearchParams;
use crate::storage::ListingStore;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

/// One full scrape: every location, dedupe, append new rows, then backfill
/// square footage on stored rows that lack it.
///
/// Backfill candidates are taken from the store as it was before this run, so
/// rows appended here are never re-fetched in the same run.
///
/// A failing location is recorded in the summary and skipped; store failures
/// abort the run.
pub async fn run_scrape(
    scraper: &dyn ScraperTrait,
    fetcher: &dyn HtmlFetcher,
    store: &dyn ListingStore,
    params: &SearchParams,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    info!("Scrape started at {}", started_at.to_rfc3339());

    let known_ids = store
        .known_ids()
        .await
        .context("Failed to load known listing ids")?;
    info!("{} listings already stored", known_ids.len());

    let backfill = if params.backfill_limit == 0 {
        Vec::new()
    } else {
        store
            .rows_missing_square_feet(params.backfill_limit)
            .await
            .context("Failed to scan for rows missing square footage")?
    };

    let mut all_listings: Vec<Listing> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    for (i, location) in params.locations.iter().enumerate() {
        if i > 0 {
            params.location_pause.wait().await;
        }

        match scraper.scrape_location(&location.name, &known_ids).await {
            Ok(listings) => {
                info!(
                    "✓ {} {}: {} listings",
                    scraper.source_name(),
                    location.name,
                    listings.len()
                );
                all_listings.extend(listings);
            }
            Err(e) => {
                let message = format!("Failed to fetch {}: {}", location.name, e);
                warn!("✗ {} {}", scraper.source_name(), message);
                errors.push(message);
            }
        }
    }

    let total_fetched = all_listings.len();
    let deduped = dedupe_listings(all_listings);
    let fresh = new_listings(&deduped, &known_ids);

    let rows: Vec<Vec<Value>> = fresh.iter().map(|listing| listing.to_row()).collect();
    let added_count = store
        .append_rows(&rows)
        .await
        .context("Failed to append new listings")?;

    let sqft_backfilled = backfill_square_feet(fetcher, store, &backfill, params).await?;

    Ok(RunSummary {
        started_at,
        total_fetched,
        deduped_fetched: deduped.len(),
        new_listings: fresh.len(),
        added_count,
        sqft_backfilled,
        error_count: errors.len(),
        errors,
    })
}

/// Re-enrich stored rows that have no square footage
pub async fn backfill_square_feet(
    fetcher: &dyn HtmlFetcher,
    store: &dyn ListingStore,
    candidates: &[BackfillCandidate],
    params: &SearchParams,
) -> Result<usize> {
    if candidates.is_empty() {
        return Ok(0);
    }
    info!("{} rows queued for square footage backfill", candidates.len());

    let enricher = DetailEnricher::new(fetcher, params.detail_pause);
    let mut filled = 0;

    for candidate in candidates {
        let Some(square_feet) = enricher.square_feet(&candidate.url).await else {
            debug!("No square footage found for {}", candidate.listing_id);
            continue;
        };

        store
            .update_cell(candidate.row_num, Column::SquareFeet, Value::from(square_feet))
            .await
            .with_context(|| format!("Failed to backfill row {}", candidate.row_num))?;
        debug!(
            "Backfilled {} sqft for {} (row {})",
            square_feet, candidate.listing_id, candidate.row_num
        );
        filled += 1;
    }

    Ok(filled)
}
