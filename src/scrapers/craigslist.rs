use crate::error::LocationError;
use crate::heuristics::{
    detect_city, extract_bedrooms, extract_price, extract_square_feet, infer_property_type,
    is_no_pets_listing, squash_whitespace,
};
use crate::models::{Listing, ListingStatus, Source};
use crate::scrapers::detail::DetailEnricher;
use crate::scrapers::fetcher::SITE_ROOT;
use crate::scrapers::traits::{HtmlFetcher, ScraperTrait};
use crate::scrapers::types::SearchParams;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info};
use url::Url;

static CARD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".cl-static-search-result, .result-row").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".title, .titlestring, .posting-title").unwrap());
static PRICE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price, .priceinfo, .result-price").unwrap());
static LOCATION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".location, .result-hood, .nearby").unwrap());

static POSTING_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(\d+)\.html").unwrap());

/// Text pulled out of one search-result card, before any filtering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCard {
    pub href: String,
    pub link_text: String,
    pub title: String,
    pub price_text: String,
    pub location_text: String,
    pub body_text: String,
}

fn element_text(element: ElementRef<'_>) -> String {
    squash_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Split a search results page into raw cards, in page order
pub fn parse_cards(html: &str) -> Vec<RawCard> {
    let document = Html::parse_document(html);

    document
        .select(&CARD_SELECTOR)
        .map(|card| {
            let link = card.select(&LINK_SELECTOR).next();
            RawCard {
                href: link
                    .and_then(|a| a.value().attr("href"))
                    .unwrap_or("")
                    .trim()
                    .to_string(),
                link_text: link.map(element_text).unwrap_or_default(),
                title: first_text(card, &TITLE_SELECTOR),
                price_text: first_text(card, &PRICE_SELECTOR),
                location_text: first_text(card, &LOCATION_SELECTOR),
                body_text: element_text(card),
            }
        })
        .collect()
}

/// Stable listing id: the posting number when the URL has one, otherwise a
/// SHA-256 prefix of the URL.
pub fn listing_id_for_url(url: &str) -> String {
    match POSTING_ID_RE.captures(url) {
        Some(caps) => format!("{}:{}", Source::Craigslist.as_str(), &caps[1]),
        None => {
            let digest = Sha256::digest(url.as_bytes());
            format!("{}:h{}", Source::Craigslist.as_str(), &hex::encode(digest)[..16])
        }
    }
}

/// Search URL for one location with the configured price and bedroom filters
pub fn search_url(location: &str, params: &SearchParams) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("query", location)
        .append_pair("min_price", &params.min_price.to_string())
        .append_pair("max_price", &params.max_price.to_string())
        .append_pair("min_bedrooms", &params.min_bedrooms.to_string())
        .append_pair("availabilityMode", "0")
        .append_pair("sale_date", "all dates")
        .finish();

    format!("{}search/apa?{}", SITE_ROOT, query)
}

fn absolute_url(href: &str) -> Option<String> {
    let url = Url::parse(SITE_ROOT).ok()?.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Craigslist apartment search scraper
pub struct CraigslistScraper<'a> {
    fetcher: &'a dyn HtmlFetcher,
    params: &'a SearchParams,
}

impl<'a> CraigslistScraper<'a> {
    pub fn new(fetcher: &'a dyn HtmlFetcher, params: &'a SearchParams) -> Self {
        Self { fetcher, params }
    }

    /// Turn one card into a listing, or `None` when a filter drops it.
    /// Square footage comes from card text only here.
    pub fn listing_from_card(
        &self,
        card: &RawCard,
        location: &str,
        seen_at: DateTime<Utc>,
    ) -> Option<Listing> {
        let params = self.params;

        if card.href.is_empty() {
            return None;
        }
        let url = absolute_url(&card.href)?;

        let title = if card.title.is_empty() {
            card.link_text.clone()
        } else {
            card.title.clone()
        };
        if title.is_empty() {
            return None;
        }

        let price_source = if card.price_text.contains('$') {
            &card.price_text
        } else {
            &title
        };
        let price = extract_price(price_source);
        if price == 0 || price < params.min_price || price > params.max_price {
            debug!("Dropped {}: price {} outside range", url, price);
            return None;
        }

        let combined = format!("{} {} {}", title, card.body_text, card.location_text);

        let bedrooms = extract_bedrooms(&combined);
        if bedrooms < params.min_bedrooms {
            debug!("Dropped {}: {} bedrooms", url, bedrooms);
            return None;
        }

        if is_no_pets_listing(&combined, params) {
            debug!("Dropped {}: no pets", url);
            return None;
        }

        let city = detect_city(&combined, location, params);
        let property_type = infer_property_type(&title, &card.body_text);
        let square_feet = extract_square_feet(&format!("{} {}", title, card.body_text));

        Some(Listing {
            listing_id: listing_id_for_url(&url),
            source: Source::Craigslist,
            first_seen_at: seen_at,
            city,
            price,
            bedrooms,
            square_feet,
            property_type,
            status: ListingStatus::New,
            address: title,
            url,
        })
    }

    /// Parse a results page into listings, enriching missing square footage
    /// from detail pages while the per-location quota lasts.
    pub async fn extract_listings(
        &self,
        html: &str,
        location: &str,
        known_ids: &HashSet<String>,
    ) -> Vec<Listing> {
        let cards = parse_cards(html);
        debug!("Found {} cards for {}", cards.len(), location);

        let enricher = DetailEnricher::new(self.fetcher, self.params.detail_pause);
        let mut detail_quota = self.params.detail_fetches_per_city;
        let mut listings = Vec::new();

        for card in &cards {
            if listings.len() >= self.params.max_per_city {
                break;
            }

            let Some(mut listing) = self.listing_from_card(card, location, Utc::now()) else {
                continue;
            };

            if known_ids.contains(&listing.listing_id) {
                debug!("Skipping known listing {}", listing.listing_id);
                continue;
            }

            if listing.square_feet.is_none() && detail_quota > 0 {
                detail_quota -= 1;
                listing.square_feet = enricher.square_feet(&listing.url).await;
            }

            listings.push(listing);
        }

        listings
    }
}

#[async_trait]
impl<'a> ScraperTrait for CraigslistScraper<'a> {
    async fn scrape_location(
        &self,
        location: &str,
        known_ids: &HashSet<String>,
    ) -> Result<Vec<Listing>, LocationError> {
        info!("Searching {}", location);

        let response = self.fetcher.fetch(&search_url(location, self.params)).await?;

        if !response.is_ok() {
            return Err(LocationError::HttpStatus(response.status));
        }
        if response.is_block_page() {
            return Err(LocationError::Blocked);
        }

        Ok(self.extract_listings(&response.body, location, known_ids).await)
    }

    fn source_name(&self) -> &'static str {
        Source::Craigslist.as_str()
    }
}
