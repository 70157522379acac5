//! In-memory stand-ins for the network and the sheet.

use crate::error::FetchError;
use crate::models::{Column, StoredRow};
use crate::scrapers::traits::{FetchResponse, HtmlFetcher};
use crate::storage::ListingStore;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned pages by exact URL; unknown URLs time out
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, FetchResponse>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HtmlFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Timeout(url.to_string()))
    }
}

/// Sheet held in memory; row 1 is the header so data starts at row 2
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Vec<String>>>,
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn read_rows(&self) -> Result<Vec<StoredRow>> {
        Ok(self
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, cells)| StoredRow::new(i + 2, cells))
            .collect())
    }

    async fn append_rows(&self, rows: &[Vec<Value>]) -> Result<usize> {
        let mut stored = self.rows.lock().unwrap();
        stored.extend(rows.iter().map(|row| row.iter().map(text).collect::<Vec<_>>()));
        Ok(rows.len())
    }

    async fn update_cell(&self, row_num: usize, column: Column, value: Value) -> Result<()> {
        let mut stored = self.rows.lock().unwrap();
        let row = row_num
            .checked_sub(2)
            .and_then(|i| stored.get_mut(i))
            .ok_or_else(|| anyhow::anyhow!("no row {}", row_num))?;
        if row.len() <= column.index() {
            row.resize(column.index() + 1, String::new());
        }
        row[column.index()] = text(&value);
        Ok(())
    }
}

/// One search result card in the markup Craigslist serves without JavaScript
pub fn card_html(href: &str, title: &str, price: &str) -> String {
    format!(
        r#"<li class="cl-static-search-result" title="{title}">
            <a href="{href}">
                <div class="title">{title}</div>
                <div class="details">
                    <div class="price">{price}</div>
                    <div class="location">Woodland Hills</div>
                </div>
            </a>
        </li>"#
    )
}

pub fn results_page(cards: &[String]) -> String {
    format!(
        r#"<html><body><ol class="cl-static-search-results">{}</ol></body></html>"#,
        cards.join("\n")
    )
}
