//! Cell data structures and the sparse cell store.
//!
//! - [`CellFormat`] - presentation hint attached to a cell
//! - [`Cell`] - display value, optional formula text, optional format
//! - [`CellStore`] - sparse mapping from [`CellRef`] to [`Cell`]
//!
//! The store never evaluates anything itself. When a formula is submitted,
//! the caller evaluates it against the current store and writes the result
//! into `value`; other formula cells are not revisited.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::cell_ref::CellRef;

/// Presentation hint for a cell. Independent of whether the cell holds a formula.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CellFormat {
    Text,
    Number,
    Currency,
    Percentage,
}

impl CellFormat {
    pub const ALL: [CellFormat; 4] = [
        CellFormat::Text,
        CellFormat::Number,
        CellFormat::Currency,
        CellFormat::Percentage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CellFormat::Text => "text",
            CellFormat::Number => "number",
            CellFormat::Currency => "currency",
            CellFormat::Percentage => "percentage",
        }
    }
}

impl fmt::Display for CellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown cell format: {}", s))
    }
}

/// A cell in the grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    /// Display value: the entered literal, or the last result of `formula`.
    pub value: String,
    /// Original formula text including the leading `=`.
    pub formula: Option<String>,
    pub format: Option<CellFormat>,
}

impl Cell {
    pub fn new_value(value: &str) -> Cell {
        Cell {
            value: value.to_string(),
            formula: None,
            format: None,
        }
    }

    /// A formula cell. `value` must be the evaluation result of `formula`.
    pub fn new_formula(formula: &str, value: &str) -> Cell {
        Cell {
            value: value.to_string(),
            formula: Some(formula.to_string()),
            format: None,
        }
    }

    pub fn with_format(mut self, format: Option<CellFormat>) -> Cell {
        self.format = format;
        self
    }

    /// Text to show when the cell is being edited: the formula if any, else the value.
    pub fn to_input_string(&self) -> &str {
        self.formula.as_deref().unwrap_or(&self.value)
    }
}

/// Sparse grid storage for the active task.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellStore {
    cells: HashMap<CellRef, Cell>,
}

impl CellStore {
    pub fn new() -> CellStore {
        CellStore::default()
    }

    /// Look up a cell. Absence is not an error; callers pick the default.
    pub fn get(&self, cell_ref: &CellRef) -> Option<&Cell> {
        self.cells.get(cell_ref)
    }

    /// The stored value string of a cell, if present.
    pub fn value(&self, cell_ref: &CellRef) -> Option<&str> {
        self.cells.get(cell_ref).map(|cell| cell.value.as_str())
    }

    /// Overwrite a cell. No merging with the previous contents.
    pub fn set(&mut self, cell_ref: CellRef, cell: Cell) {
        self.cells.insert(cell_ref, cell);
    }

    /// Replace the whole store.
    pub fn reset(&mut self, initial: CellStore) {
        *self = initial;
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }

    /// Cells in row-major order, for deterministic output.
    pub fn sorted(&self) -> Vec<(&CellRef, &Cell)> {
        let mut cells: Vec<_> = self.cells.iter().collect();
        cells.sort_by_key(|(cell_ref, _)| **cell_ref);
        cells
    }
}

impl FromIterator<(CellRef, Cell)> for CellStore {
    fn from_iter<I: IntoIterator<Item = (CellRef, Cell)>>(iter: I) -> Self {
        CellStore {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_without_merge() {
        let mut store = CellStore::new();
        let a1 = CellRef::new(0, 0);
        store.set(
            a1,
            Cell::new_value("10").with_format(Some(CellFormat::Currency)),
        );
        store.set(a1, Cell::new_value("20"));

        let cell = store.get(&a1).unwrap();
        assert_eq!(cell.value, "20");
        assert_eq!(cell.format, None);
    }

    #[test]
    fn test_reset_replaces_everything() {
        let mut store: CellStore = [(CellRef::new(0, 0), Cell::new_value("1"))]
            .into_iter()
            .collect();
        let fresh: CellStore = [(CellRef::new(1, 1), Cell::new_value("2"))]
            .into_iter()
            .collect();

        store.reset(fresh);
        assert_eq!(store.len(), 1);
        assert!(store.get(&CellRef::new(0, 0)).is_none());
        assert_eq!(store.value(&CellRef::new(1, 1)), Some("2"));
    }

    #[test]
    fn test_sorted_is_row_major() {
        let store: CellStore = ["B1", "A2", "A1"]
            .into_iter()
            .map(|id| (CellRef::from_str(id).unwrap(), Cell::new_value(id)))
            .collect();
        let order: Vec<String> = store.sorted().iter().map(|(r, _)| r.to_string()).collect();
        assert_eq!(order, vec!["A1", "B1", "A2"]);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("Currency".parse::<CellFormat>(), Ok(CellFormat::Currency));
        assert_eq!(" percentage ".parse::<CellFormat>(), Ok(CellFormat::Percentage));
        assert!("conditional".parse::<CellFormat>().is_err());
    }

    #[test]
    fn test_input_string_prefers_formula() {
        assert_eq!(Cell::new_formula("=A1", "5").to_input_string(), "=A1");
        assert_eq!(Cell::new_value("5").to_input_string(), "5");
    }
}
