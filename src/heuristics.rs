//! Text heuristics that turn free listing text into typed fields.
//!
//! Every list here is a priority list: the first pattern or keyword set that
//! matches decides the outcome, so the order of entries is significant.

use crate::models::PropertyType;
use crate::scrapers::types::SearchParams;
use regex::Regex;
use std::sync::LazyLock;

/// Square footage outside this range is treated as noise
pub const MIN_SQUARE_FEET: u32 = 200;
pub const MAX_SQUARE_FEET: u32 = 20_000;

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d[\d,]*)").unwrap());

static BEDROOMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:br|bed|bedroom)s?\b").unwrap());

static SQFT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 850 sqft, 850 sq ft, 850 sq. ft., 850sf
        r"(?i)(\d{3,5})\s*(?:sq\.?\s*ft\.?|sqft|sf)\b",
        // 850-sq-ft, 850 - sq ft, 850 sq-ft
        r"(?i)\b(\d{3,5})\s*-?\s*sq\.?\s*-?\s*ft\.?\b",
        // 850ft2, 850 ft²
        r"(?i)\b(\d{3,5})\s*ft(?:2|²)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static PROPERTY_TYPE_RULES: LazyLock<Vec<(PropertyType, Regex)>> = LazyLock::new(|| {
    [
        (PropertyType::House, r"\b(?:house|single[\s-]?family|sfr)\b"),
        (PropertyType::Apartment, r"\b(?:apartment|apt|studio)\b"),
        (PropertyType::Condo, r"\b(?:condo|condominium)\b"),
        (PropertyType::Townhouse, r"\b(?:townhouse|town[\s-]?house|townhome)\b"),
        (
            PropertyType::Adu,
            r"\b(?:adu|granny[\s-]?flat|in[\s-]?law|guest[\s-]?house)\b",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

/// First `$1,234` amount in the text, or 0 when there is none
pub fn extract_price(text: &str) -> u32 {
    PRICE_RE
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
        .unwrap_or(0)
}

/// First `<n> br|bed|bedroom(s)` count; studios and misses count as 1
pub fn extract_bedrooms(text: &str) -> u32 {
    BEDROOMS_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(1)
}

/// Square footage from the first pattern that yields a plausible value
pub fn extract_square_feet(text: &str) -> Option<u32> {
    SQFT_PATTERNS.iter().find_map(|re| {
        let value: u32 = re.captures(text)?[1].parse().ok()?;
        (MIN_SQUARE_FEET..=MAX_SQUARE_FEET)
            .contains(&value)
            .then_some(value)
    })
}

pub fn infer_property_type(title: &str, description: &str) -> PropertyType {
    let combined = format!("{} {}", title, description).to_lowercase();
    PROPERTY_TYPE_RULES
        .iter()
        .find(|(_, re)| re.is_match(&combined))
        .map(|(kind, _)| *kind)
        .unwrap_or(PropertyType::Other)
}

pub fn is_no_pets_listing(text: &str, params: &SearchParams) -> bool {
    let lower = text.to_lowercase();
    params
        .no_pet_markers
        .iter()
        .any(|marker| lower.contains(marker.as_str()))
}

/// Work out which configured city a listing really belongs to.
///
/// Checks the queried location first, then every configured location, then
/// the alias neighborhoods; falls back to the queried location. The result is
/// always passed through alias normalization.
pub fn detect_city(text: &str, queried: &str, params: &SearchParams) -> String {
    let lower = text.to_lowercase();

    let queried_match = params
        .location(queried)
        .filter(|spec| spec.matches(&lower))
        .map(|spec| spec.name.clone());

    let resolved = queried_match
        .or_else(|| {
            params
                .locations
                .iter()
                .find(|spec| spec.matches(&lower))
                .map(|spec| spec.name.clone())
        })
        .or_else(|| {
            params
                .city_aliases
                .iter()
                .find(|(alias, _)| lower.contains(alias.as_str()))
                .map(|(alias, _)| alias.clone())
        })
        .unwrap_or_else(|| queried.to_string());

    params.normalize_city(&resolved)
}

/// Collapse runs of whitespace into single spaces
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
