use crate::error::{FetchError, LocationError};
use crate::models::Listing;
use async_trait::async_trait;
use std::collections::HashSet;

/// Raw HTTP outcome: any status is a response, only transport failures are errors
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Craigslist serves its block notice with a normal status code
    pub fn is_block_page(&self) -> bool {
        self.body.to_lowercase().contains("your request has been blocked")
    }
}

/// Common trait for page fetchers.
/// Lets the extractor and enricher run against the network or canned pages.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Fetch a page once, no retries
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Common trait for all listing sources.
/// One call per searched location; a failure only costs that location.
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// New listings for one location, skipping ids already in `known_ids`
    async fn scrape_location(
        &self,
        location: &str,
        known_ids: &HashSet<String>,
    ) -> Result<Vec<Listing>, LocationError>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
