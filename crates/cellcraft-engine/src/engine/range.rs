//! Rectangular cell ranges (`A1:A5`, `B2:D4`) and their expansion.
//!
//! Expansion walks columns in the outer loop and rows in the inner loop, so
//! `A1:B2` yields `A1, A2, B1, B2`. Both ends are inclusive. A range whose end
//! lies before its start on either axis expands to nothing.

use std::fmt;

use super::cell_ref::CellRef;
use crate::error::EvalError;

/// An inclusive span between two cells.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(start: CellRef, end: CellRef) -> CellRange {
        CellRange { start, end }
    }

    /// Parse `START:END` notation. Returns None if either side is not a cell.
    pub fn parse(range: &str) -> Option<CellRange> {
        let (start, end) = range.split_once(':')?;
        let start = CellRef::from_str(start.trim())?;
        let end = CellRef::from_str(end.trim())?;
        Some(CellRange::new(start, end))
    }

    /// Number of cells the range expands to.
    pub fn len(&self) -> usize {
        let cols = (self.end.col + 1).saturating_sub(self.start.col);
        let rows = (self.end.row + 1).saturating_sub(self.start.row);
        cols.saturating_mul(rows)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the cells column-major.
    pub fn cells(self) -> impl Iterator<Item = CellRef> {
        let (start, end) = (self.start, self.end);
        (start.col..=end.col)
            .flat_map(move |col| (start.row..=end.row).map(move |row| CellRef::new(col, row)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Expand a range to its constituent cells, column-major, inclusive of both ends.
pub fn expand_range(start: &CellRef, end: &CellRef) -> Vec<CellRef> {
    CellRange::new(*start, *end).cells().collect()
}

/// String-level form of [`expand_range`]: `("A1", "A3")` -> `["A1", "A2", "A3"]`.
pub fn expand_range_ids(start: &str, end: &str) -> Result<Vec<String>, EvalError> {
    let start_ref =
        CellRef::from_str(start).ok_or_else(|| EvalError::InvalidReference(start.to_string()))?;
    let end_ref =
        CellRef::from_str(end).ok_or_else(|| EvalError::InvalidReference(end.to_string()))?;
    Ok(expand_range(&start_ref, &end_ref)
        .iter()
        .map(|cell| cell.to_string())
        .collect())
}
