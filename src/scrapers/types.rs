use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A searchable location and the text markers that identify it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSpec {
    /// Canonical name, also used as the search query
    pub name: String,
    /// Lowercase name variants and postal codes, in match order
    pub keywords: Vec<String>,
}

impl LocationSpec {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Whether any keyword appears in already-lowercased text
    pub fn matches(&self, lower_text: &str) -> bool {
        self.keywords.iter().any(|k| lower_text.contains(k.as_str()))
    }
}

/// Randomised pause window, in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PauseRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl PauseRange {
    #[cfg(test)]
    pub const NONE: PauseRange = PauseRange {
        min_secs: 0.0,
        max_secs: 0.0,
    };

    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Sleep for a random duration inside the window
    pub async fn wait(&self) {
        let secs = self.pick_secs();
        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }

    fn pick_secs(&self) -> f64 {
        if self.max_secs <= 0.0 {
            0.0
        } else if self.max_secs > self.min_secs {
            rand::thread_rng().gen_range(self.min_secs.max(0.0)..self.max_secs)
        } else {
            self.max_secs
        }
    }
}

/// Search parameters for rental scraping.
///
/// Immutable once built; passed explicitly to the heuristics, extractor and
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Lowest monthly rent accepted (inclusive)
    pub min_price: u32,
    /// Highest monthly rent accepted (inclusive)
    pub max_price: u32,
    /// Minimum number of bedrooms
    pub min_bedrooms: u32,
    /// Locations to search, in priority order for city detection
    pub locations: Vec<LocationSpec>,
    /// Neighborhood (lowercase) -> canonical city, in match order
    pub city_aliases: Vec<(String, String)>,
    /// Lowercase phrases that mark a listing as not pet friendly
    pub no_pet_markers: Vec<String>,
    /// Listings emitted per location at most
    pub max_per_city: usize,
    /// Detail pages fetched per location at most
    pub detail_fetches_per_city: usize,
    /// Stored rows re-enriched per run at most
    pub backfill_limit: usize,
    /// Pause between locations
    pub location_pause: PauseRange,
    /// Pause between detail page fetches
    pub detail_pause: PauseRange,
}

impl SearchParams {
    /// Map a neighborhood name onto its canonical city
    pub fn normalize_city(&self, city: &str) -> String {
        let key = city.trim().to_lowercase();
        self.city_aliases
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| canonical.clone())
            .unwrap_or_else(|| city.to_string())
    }

    pub fn location(&self, name: &str) -> Option<&LocationSpec> {
        self.locations.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        let aliases = [
            ("canoga park", "West Hills"),
            ("winnetka", "West Hills"),
            ("reseda", "Woodland Hills"),
            ("encino", "Woodland Hills"),
            ("northridge", "Woodland Hills"),
            ("tarzana", "Woodland Hills"),
        ];
        let markers = [
            "no pets",
            "no pet",
            "pets not allowed",
            "pet free",
            "no dogs",
            "no cats",
        ];

        Self {
            min_price: 2000,
            max_price: 2700,
            min_bedrooms: 1,
            locations: vec![
                LocationSpec::new(
                    "Woodland Hills",
                    &["woodland hills", "woodland hls", "91364", "91365", "91367", "91371"],
                ),
                LocationSpec::new("West Hills", &["west hills", "91307", "91308"]),
                LocationSpec::new("Newbury Park", &["newbury park", "91319", "91320"]),
                LocationSpec::new("Calabasas", &["calabasas", "91302", "91372"]),
                LocationSpec::new(
                    "Sherman Oaks",
                    &["sherman oaks", "91403", "91413", "91423", "91495"],
                ),
                LocationSpec::new(
                    "Thousand Oaks",
                    &["thousand oaks", "91358", "91360", "91362"],
                ),
                LocationSpec::new("Oak Park", &["oak park", "91377"]),
                LocationSpec::new("Simi Valley", &["simi valley", "93063", "93065"]),
            ],
            city_aliases: aliases
                .iter()
                .map(|(a, c)| (a.to_string(), c.to_string()))
                .collect(),
            no_pet_markers: markers.iter().map(|m| m.to_string()).collect(),
            max_per_city: 120,
            detail_fetches_per_city: 15,
            backfill_limit: 25,
            location_pause: PauseRange::new(1.2, 2.4),
            detail_pause: PauseRange::new(0.6, 1.4),
        }
    }
}
