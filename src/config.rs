use crate::scrapers::types::SearchParams;
use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub service_account_json: String,
    pub sheet_id: String,
    pub sheet_name: String,
    pub fetch_timeout: Duration,
    pub search: SearchParams,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Missing {} env var", key))
        };

        let defaults = SearchParams::default();
        let search = SearchParams {
            min_price: parse_or(&lookup, "SCOUT_MIN_PRICE", defaults.min_price)?,
            max_price: parse_or(&lookup, "SCOUT_MAX_PRICE", defaults.max_price)?,
            min_bedrooms: parse_or(&lookup, "SCOUT_MIN_BEDROOMS", defaults.min_bedrooms)?,
            max_per_city: parse_or(&lookup, "SCOUT_MAX_PER_CITY", defaults.max_per_city)?,
            detail_fetches_per_city: parse_or(
                &lookup,
                "SCOUT_DETAIL_FETCHES_PER_CITY",
                defaults.detail_fetches_per_city,
            )?,
            backfill_limit: parse_or(&lookup, "SCOUT_BACKFILL_LIMIT", defaults.backfill_limit)?,
            ..defaults
        };

        if search.min_price > search.max_price {
            bail!(
                "SCOUT_MIN_PRICE ({}) is above SCOUT_MAX_PRICE ({})",
                search.min_price,
                search.max_price
            );
        }

        Ok(Self {
            service_account_json: required("GOOGLE_SERVICE_ACCOUNT_JSON")?,
            sheet_id: required("GOOGLE_SHEET_ID")?,
            sheet_name: lookup("SCOUT_SHEET_NAME").unwrap_or_else(|| "Sheet1".to_string()),
            fetch_timeout: Duration::from_secs(25),
            search,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
