//! Run-level deduplication and backfill selection.

use crate::models::{BackfillCandidate, CategoryBucket, Column, Listing, ListingStatus, StoredRow};
use std::collections::{BTreeMap, HashSet};

/// Keep the first listing seen for each id, preserving order
pub fn dedupe_listings(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| seen.insert(listing.listing_id.clone()))
        .collect()
}

/// Listings whose id is not already stored
pub fn new_listings<'a>(listings: &'a [Listing], known_ids: &HashSet<String>) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| !known_ids.contains(&listing.listing_id))
        .collect()
}

/// Stored rows with an empty square-footage cell, newest first, at most `limit`
pub fn select_backfill_candidates(rows: &[StoredRow], limit: usize) -> Vec<BackfillCandidate> {
    rows.iter()
        .rev()
        .filter(|row| {
            row.cell(Column::SquareFeet).is_empty()
                && !row.listing_id().is_empty()
                && !row.url().is_empty()
        })
        .take(limit)
        .map(|row| BackfillCandidate {
            row_num: row.row_num,
            url: row.url().to_string(),
            listing_id: row.listing_id().to_string(),
        })
        .collect()
}

/// Stored listings grouped by status, then category, then city
pub type GroupedRows<'a> =
    BTreeMap<ListingStatus, BTreeMap<CategoryBucket, BTreeMap<String, Vec<&'a StoredRow>>>>;

/// Group stored rows for display; each city list is cheapest first.
/// Rows with an unreadable price sort last.
pub fn group_rows(rows: &[StoredRow]) -> GroupedRows<'_> {
    let mut groups: GroupedRows<'_> = BTreeMap::new();
    for row in rows.iter().filter(|row| !row.listing_id().is_empty()) {
        let city = match row.city() {
            "" => "Unknown".to_string(),
            city => city.to_string(),
        };
        groups
            .entry(row.status())
            .or_default()
            .entry(row.category_bucket())
            .or_default()
            .entry(city)
            .or_default()
            .push(row);
    }

    for listings in groups
        .values_mut()
        .flat_map(|buckets| buckets.values_mut())
        .flat_map(|cities| cities.values_mut())
    {
        listings.sort_by_key(|row| row.price().unwrap_or(u32::MAX));
    }
    groups
}
