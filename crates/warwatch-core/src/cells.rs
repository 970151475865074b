//! Typed accessor over heterogeneous spreadsheet cell values.
//!
//! The persistence boundary unavoidably deals with untyped row data — a
//! spreadsheet row is a tuple of cells and a cell can be a string, an
//! integer, a missing value, and so on. Rather than let `String`/`i64`/
//! `Option<i64>` leak into every call site that talks to a `LedgerStore`,
//! every conversion is centralized here. Nothing outside this module
//! should construct or match on raw cell representations.

use std::fmt;

/// One cell of a persisted row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(f) => Some(*f),
            Cell::Int(i) => Some(*i as f64),
            Cell::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty) || matches!(self, Cell::Str(s) if s.is_empty())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Str(s) => write!(f, "{s}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v:.2}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Empty => write!(f, ""),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Str(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Str(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// Empty faction-id cells must serialize as the empty string, not `0` —
/// this is the one spot that decision is encoded (spec §6.5).
pub fn optional_faction_id(id: Option<i64>) -> Cell {
    match id {
        Some(id) => Cell::Int(id),
        None => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_faction_id_absent_is_empty_not_zero() {
        assert_eq!(optional_faction_id(None), Cell::Empty);
        assert_eq!(optional_faction_id(None).to_string(), "");
    }

    #[test]
    fn optional_faction_id_present_round_trips() {
        assert_eq!(optional_faction_id(Some(42)).as_i64(), Some(42));
    }

    #[test]
    fn str_cell_parses_as_int_for_loosely_typed_upstream_rows() {
        let cell = Cell::from("1704105200");
        assert_eq!(cell.as_i64(), Some(1_704_105_200));
    }
}
