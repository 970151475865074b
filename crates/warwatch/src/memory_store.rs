//! In-process `LedgerStore`, used for `--once` smoke runs without a
//! configured spreadsheet backend and as the backing fixture for
//! integration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use warwatch_core::store::Row;
use warwatch_core::{Cell, LedgerStore};
use warwatch_core::error::PersistenceError;

#[derive(Default)]
pub struct MemoryLedgerStore {
    tabs: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tabs<T>(&self, f: impl FnOnce(&mut HashMap<String, Vec<Row>>) -> T) -> T {
        let mut guard = self.tabs.lock().expect("ledger store mutex poisoned");
        f(&mut guard)
    }
}

/// Maps a 1-based inclusive `[start_row, end_row]` (row 2 is the first data
/// row) onto a 0-based half-open slice range into `len` stored rows.
fn row_slice_range(start_row: usize, end_row: usize, len: usize) -> (usize, usize) {
    let start = start_row.saturating_sub(2).min(len);
    let end = if end_row == usize::MAX {
        len
    } else {
        end_row.saturating_sub(2).saturating_add(1).min(len)
    };
    (start, end.max(start))
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn ensure_tab(&self, name: &str) -> Result<(), PersistenceError> {
        self.with_tabs(|tabs| {
            tabs.entry(name.to_string()).or_default();
        });
        Ok(())
    }

    async fn tab_exists(&self, name: &str) -> Result<bool, PersistenceError> {
        Ok(self.with_tabs(|tabs| tabs.contains_key(name)))
    }

    async fn read_range(&self, tab: &str, start_row: usize, end_row: usize) -> Result<Vec<Row>, PersistenceError> {
        Ok(self.with_tabs(|tabs| {
            let rows = tabs.get(tab).cloned().unwrap_or_default();
            let (start, end) = row_slice_range(start_row, end_row, rows.len());
            rows[start..end].to_vec()
        }))
    }

    async fn overwrite_range(&self, tab: &str, start_row: usize, rows: Vec<Row>) -> Result<(), PersistenceError> {
        self.with_tabs(|tabs| {
            let entry = tabs.entry(tab.to_string()).or_default();
            let start = start_row.saturating_sub(2);
            if entry.len() < start + rows.len() {
                entry.resize(start + rows.len(), Vec::new());
            }
            for (offset, row) in rows.into_iter().enumerate() {
                entry[start + offset] = row;
            }
        });
        Ok(())
    }

    async fn append_rows(&self, tab: &str, rows: Vec<Row>) -> Result<(), PersistenceError> {
        self.with_tabs(|tabs| tabs.entry(tab.to_string()).or_default().extend(rows));
        Ok(())
    }

    async fn clear_range(&self, tab: &str, start_row: usize, end_row: usize) -> Result<(), PersistenceError> {
        self.with_tabs(|tabs| {
            if let Some(rows) = tabs.get_mut(tab) {
                let (start, end) = row_slice_range(start_row, end_row, rows.len());
                for row in &mut rows[start..end] {
                    *row = vec![Cell::Empty];
                }
            }
        });
        Ok(())
    }

    async fn ensure_capacity(&self, _tab: &str, _rows: usize, _cols: usize) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_then_read_round_trips() {
        let store = MemoryLedgerStore::new();
        store.ensure_tab("Records - 1").await.unwrap();
        store
            .append_rows("Records - 1", vec![vec![Cell::Int(1)], vec![Cell::Int(2)]])
            .await
            .unwrap();
        let rows = store.read_range("Records - 1", 2, usize::MAX).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn overwrite_range_replaces_in_place() {
        let store = MemoryLedgerStore::new();
        store.ensure_tab("Summary - 1").await.unwrap();
        store
            .overwrite_range("Summary - 1", 2, vec![vec![Cell::Int(1)]])
            .await
            .unwrap();
        store
            .overwrite_range("Summary - 1", 2, vec![vec![Cell::Int(2)]])
            .await
            .unwrap();
        let rows = store.read_range("Summary - 1", 2, 3).await.unwrap();
        assert_eq!(rows, vec![vec![Cell::Int(2)]]);
    }
}
