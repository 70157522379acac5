pub mod craigslist;
pub mod detail;
pub mod fetcher;
pub mod traits;
pub mod types;

pub use craigslist::CraigslistScraper;
pub use fetcher::ReqwestFetcher;
