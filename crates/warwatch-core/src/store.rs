//! Ledger store boundary (spec §6.4). Row-level tabular persistence, one
//! tab per war (Summary/Records/Status) and two tabs per tracked faction
//! (Previous States/State Changes). Wire format of rows is exactly the
//! `Cell` newtype from `cells` — nothing here or above leaks an untyped
//! value.

use crate::cells::Cell;
use crate::error::PersistenceError;
use async_trait::async_trait;

pub type Row = Vec<Cell>;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn ensure_tab(&self, name: &str) -> Result<(), PersistenceError>;

    async fn tab_exists(&self, name: &str) -> Result<bool, PersistenceError>;

    /// `start_row`/`end_row` are 1-based spreadsheet row numbers, both
    /// ends inclusive (row 1 is the header row; data starts at row 2).
    /// `end_row == usize::MAX` means "to the last row of the tab".
    /// `read_range(tab, 2, 2)` returns exactly row 2 if it has data, or an
    /// empty vec if the tab has no data rows yet.
    async fn read_range(
        &self,
        tab: &str,
        start_row: usize,
        end_row: usize,
    ) -> Result<Vec<Row>, PersistenceError>;

    async fn overwrite_range(&self, tab: &str, start_row: usize, rows: Vec<Row>) -> Result<(), PersistenceError>;

    async fn append_rows(&self, tab: &str, rows: Vec<Row>) -> Result<(), PersistenceError>;

    /// Same inclusive 1-based row convention as `read_range`.
    async fn clear_range(&self, tab: &str, start_row: usize, end_row: usize) -> Result<(), PersistenceError>;

    async fn ensure_capacity(&self, tab: &str, rows: usize, cols: usize) -> Result<(), PersistenceError>;
}

pub fn previous_states_tab(faction_id: i64) -> String {
    format!("Previous States - {faction_id}")
}

pub fn state_changes_tab(faction_id: i64) -> String {
    format!("State Changes - {faction_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_names_follow_the_documented_convention() {
        assert_eq!(previous_states_tab(42), "Previous States - 42");
        assert_eq!(state_changes_tab(42), "State Changes - 42");
    }
}
