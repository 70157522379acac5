pub mod sheets;

pub use sheets::SheetsStore;

use crate::models::{BackfillCandidate, Column, ListingStatus, StoredRow};
use crate::reconcile::select_backfill_candidates;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

/// Tabular listing store: read rows back, append new rows, patch single cells.
///
/// Row numbers are 1-based sheet rows with the header in row 1.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Every data row, oldest first
    async fn read_rows(&self) -> Result<Vec<StoredRow>>;

    /// Append rows at the end; returns how many were written
    async fn append_rows(&self, rows: &[Vec<Value>]) -> Result<usize>;

    async fn update_cell(&self, row_num: usize, column: Column, value: Value) -> Result<()>;

    async fn known_ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .read_rows()
            .await?
            .iter()
            .map(|row| row.listing_id().to_string())
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// Rows lacking square footage, most recent first
    async fn rows_missing_square_feet(&self, limit: usize) -> Result<Vec<BackfillCandidate>> {
        let rows = self.read_rows().await?;
        Ok(select_backfill_candidates(&rows, limit))
    }

    /// Overwrite a listing's status; `false` when the id is not stored
    async fn set_status(&self, listing_id: &str, status: ListingStatus) -> Result<bool> {
        let rows = self.read_rows().await?;
        let Some(row) = rows.iter().find(|row| row.listing_id() == listing_id) else {
            return Ok(false);
        };
        self.update_cell(row.row_num, Column::Status, Value::from(status.as_str()))
            .await?;
        Ok(true)
    }
}
