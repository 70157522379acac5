use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Source of the rental listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Craigslist,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Craigslist => "craigslist",
        }
    }
}

/// Kind of dwelling, inferred from listing text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Condo,
    Townhouse,
    Adu,
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Adu => "adu",
            PropertyType::Other => "other",
        }
    }

    /// Display grouping for this property type
    pub fn bucket(&self) -> CategoryBucket {
        match self {
            PropertyType::House | PropertyType::Adu => CategoryBucket::House,
            PropertyType::Apartment => CategoryBucket::Apartment,
            PropertyType::Condo | PropertyType::Townhouse => CategoryBucket::CondoTownhouse,
            PropertyType::Other => CategoryBucket::Other,
        }
    }
}

impl FromStr for PropertyType {
    type Err = std::convert::Infallible;

    /// Lenient parse of a stored cell; anything unrecognised is `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "house" => PropertyType::House,
            "apartment" => PropertyType::Apartment,
            "condo" => PropertyType::Condo,
            "townhouse" => PropertyType::Townhouse,
            "adu" => PropertyType::Adu,
            _ => PropertyType::Other,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryBucket {
    House,
    Apartment,
    CondoTownhouse,
    Other,
}

impl CategoryBucket {
    pub fn label(&self) -> &'static str {
        match self {
            CategoryBucket::House => "House",
            CategoryBucket::Apartment => "Apartment",
            CategoryBucket::CondoTownhouse => "Condo & Townhouse",
            CategoryBucket::Other => "Other / Unknown",
        }
    }
}

impl fmt::Display for CategoryBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Review state of a stored listing. Scraping only ever creates `New`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    New,
    Love,
    Nope,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::New => "new",
            ListingStatus::Love => "love",
            ListingStatus::Nope => "nope",
        }
    }
}

impl FromStr for ListingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(ListingStatus::New),
            "love" => Ok(ListingStatus::Love),
            "nope" => Ok(ListingStatus::Nope),
            other => anyhow::bail!("invalid status '{}' (expected new, love or nope)", other),
        }
    }
}

/// Core rental listing data model
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub listing_id: String,
    pub source: Source,
    pub first_seen_at: DateTime<Utc>,
    pub city: String,
    pub price: u32,
    pub bedrooms: u32,
    pub square_feet: Option<u32>,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub address: String,
    pub url: String,
}

impl Listing {
    pub fn category_bucket(&self) -> CategoryBucket {
        self.property_type.bucket()
    }

    /// Store row in column order A..L
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.listing_id),
            json!(self.source.as_str()),
            json!(self.first_seen_at.to_rfc3339()),
            json!(self.city),
            json!(self.price),
            json!(self.bedrooms),
            json!(self.property_type.as_str()),
            json!(self.category_bucket().label()),
            json!(self.status.as_str()),
            json!(self.address),
            json!(self.url),
            self.square_feet.map(|v| json!(v)).unwrap_or_else(|| json!("")),
        ]
    }
}

/// Columns of the listing sheet, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    ListingId,
    Source,
    FirstSeenAt,
    City,
    Price,
    Bedrooms,
    PropertyType,
    CategoryBucket,
    Status,
    Address,
    Url,
    SquareFeet,
}

impl Column {
    #[cfg(test)]
    pub const COUNT: usize = 12;

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Spreadsheet column letter (A..L)
    pub fn letter(&self) -> char {
        (b'A' + self.index() as u8) as char
    }
}

/// A listing row as read back from the store.
///
/// `row_num` is the 1-based sheet row; the header occupies row 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub row_num: usize,
    pub cells: Vec<String>,
}

impl StoredRow {
    pub fn new(row_num: usize, cells: Vec<String>) -> Self {
        Self { row_num, cells }
    }

    /// Trimmed cell value; missing trailing cells read as empty.
    pub fn cell(&self, column: Column) -> &str {
        self.cells
            .get(column.index())
            .map(|c| c.trim())
            .unwrap_or("")
    }

    pub fn listing_id(&self) -> &str {
        self.cell(Column::ListingId)
    }

    pub fn url(&self) -> &str {
        self.cell(Column::Url)
    }

    pub fn city(&self) -> &str {
        self.cell(Column::City)
    }

    /// Monthly rent; the sheet may hand numbers back formatted as "$2,450"
    pub fn price(&self) -> Option<u32> {
        self.cell(Column::Price)
            .trim_start_matches('$')
            .replace(',', "")
            .parse()
            .ok()
    }

    pub fn status(&self) -> ListingStatus {
        self.cell(Column::Status).parse().unwrap_or(ListingStatus::New)
    }

    pub fn category_bucket(&self) -> CategoryBucket {
        self.cell(Column::PropertyType)
            .parse::<PropertyType>()
            .map(|t| t.bucket())
            .unwrap_or(CategoryBucket::Other)
    }
}

/// Reference to a stored row that still lacks square footage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillCandidate {
    pub row_num: usize,
    pub url: String,
    pub listing_id: String,
}

/// End-of-run report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub total_fetched: usize,
    pub deduped_fetched: usize,
    pub new_listings: usize,
    pub added_count: usize,
    pub sqft_backfilled: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

impl RunSummary {
    /// Nothing came back and something failed: the source is probably
    /// blocking us rather than simply having no matches.
    pub fn looks_blocked(&self) -> bool {
        self.total_fetched == 0 && !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(property_type: PropertyType, square_feet: Option<u32>) -> Listing {
        Listing {
            listing_id: "craigslist:7712345678".to_string(),
            source: Source::Craigslist,
            first_seen_at: Utc::now(),
            city: "West Hills".to_string(),
            price: 2450,
            bedrooms: 2,
            square_feet,
            property_type,
            status: ListingStatus::New,
            address: "Sunny 2br near park".to_string(),
            url: "https://losangeles.craigslist.org/sfv/apa/d/x/7712345678.html".to_string(),
        }
    }

    #[test]
    fn bucket_follows_property_type() {
        assert_eq!(PropertyType::House.bucket(), CategoryBucket::House);
        assert_eq!(PropertyType::Adu.bucket(), CategoryBucket::House);
        assert_eq!(PropertyType::Apartment.bucket(), CategoryBucket::Apartment);
        assert_eq!(PropertyType::Condo.bucket(), CategoryBucket::CondoTownhouse);
        assert_eq!(PropertyType::Townhouse.bucket(), CategoryBucket::CondoTownhouse);
        assert_eq!(PropertyType::Other.bucket().label(), "Other / Unknown");
    }

    #[test]
    fn row_has_contract_column_order() {
        let row = listing(PropertyType::Condo, None);
        assert_eq!(row.to_row().len(), Column::COUNT);
        let row = row.to_row();
        assert_eq!(row[Column::ListingId.index()], json!("craigslist:7712345678"));
        assert_eq!(row[Column::Source.index()], json!("craigslist"));
        assert_eq!(row[Column::Price.index()], json!(2450));
        assert_eq!(row[Column::PropertyType.index()], json!("condo"));
        assert_eq!(row[Column::CategoryBucket.index()], json!("Condo & Townhouse"));
        assert_eq!(row[Column::Status.index()], json!("new"));
        assert_eq!(row[Column::SquareFeet.index()], json!(""));

        let with_sqft = listing(PropertyType::House, Some(900)).to_row();
        assert_eq!(with_sqft[Column::SquareFeet.index()], json!(900));
    }

    #[test]
    fn column_letters() {
        assert_eq!(Column::ListingId.letter(), 'A');
        assert_eq!(Column::Status.letter(), 'I');
        assert_eq!(Column::SquareFeet.letter(), 'L');
    }

    #[test]
    fn stored_row_reads_short_rows_as_empty() {
        let row = StoredRow::new(5, vec!["craigslist:1".to_string(), "craigslist".to_string()]);
        assert_eq!(row.listing_id(), "craigslist:1");
        assert_eq!(row.url(), "");
        assert_eq!(row.cell(Column::SquareFeet), "");
        assert_eq!(row.status(), ListingStatus::New);
        assert_eq!(row.price(), None);
    }

    #[test]
    fn stored_price_tolerates_sheet_formatting() {
        let mut cells = vec![String::new(); Column::COUNT];
        cells[Column::Price.index()] = "$2,450".to_string();
        assert_eq!(StoredRow::new(2, cells).price(), Some(2450));
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!("Love".parse::<ListingStatus>().unwrap(), ListingStatus::Love);
        assert!("maybe".parse::<ListingStatus>().is_err());
    }
}
