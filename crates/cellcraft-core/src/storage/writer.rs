//! Writer for cell files.

use crate::error::Result;
use cellcraft_engine::engine::{CellStore, parse_number};
use std::fs;
use std::path::Path;

/// Write cells to a file.
pub fn write_cells(path: &Path, cells: &CellStore) -> Result<()> {
    fs::write(path, write_cells_content(cells))?;
    Ok(())
}

/// Write cells to the cell file format, row-major.
pub fn write_cells_content(cells: &CellStore) -> String {
    let mut lines = vec!["# Cellcraft cells".to_string()];

    for (cell_ref, cell) in cells.sorted() {
        let key = match cell.format {
            Some(format) => format!("{}[{}]", cell_ref, format),
            None => cell_ref.to_string(),
        };

        let value = match &cell.formula {
            Some(formula) => formula.clone(),
            None if is_bare_number(&cell.value) => cell.value.clone(),
            None => format!("\"{}\"", escape_text(&cell.value)),
        };

        lines.push(format!("{}: {}", key, value));
    }

    lines.join("\n") + "\n"
}

/// Numbers are written bare only when they read back unchanged.
fn is_bare_number(value: &str) -> bool {
    value.trim() == value && parse_number(value).is_some()
}

fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_cells_content;
    use cellcraft_engine::engine::{Cell, CellFormat, CellRef};
    use pretty_assertions::assert_eq;

    fn cell(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    #[test]
    fn test_write_values_and_formulas() {
        let mut store = CellStore::new();
        store.set(cell("A1"), Cell::new_value("42"));
        store.set(cell("A2"), Cell::new_value("Total"));
        store.set(cell("B1"), Cell::new_formula("=A1*2", "84"));
        store.set(
            cell("C1"),
            Cell::new_value("2450.75").with_format(Some(CellFormat::Currency)),
        );

        let content = write_cells_content(&store);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "# Cellcraft cells",
                "A1: 42",
                "B1: =A1*2",
                "C1[currency]: 2450.75",
                "A2: \"Total\"",
            ]
        );
    }

    #[test]
    fn test_text_that_looks_odd_is_quoted() {
        let mut store = CellStore::new();
        store.set(cell("A1"), Cell::new_value(""));
        store.set(cell("A2"), Cell::new_value(" 5"));
        store.set(cell("A3"), Cell::new_value("say \"hi\""));
        let content = write_cells_content(&store);
        assert!(content.contains("A1: \"\""));
        assert!(content.contains("A2: \" 5\""));
        assert!(content.contains(r#"A3: "say \"hi\"""#));
    }

    #[test]
    fn test_written_file_reloads() {
        let mut store = CellStore::new();
        store.set(cell("A1"), Cell::new_value("10"));
        store.set(cell("A2"), Cell::new_value("C:\\data"));
        store.set(
            cell("A3"),
            Cell::new_formula("=A1/4", "2.5").with_format(Some(CellFormat::Percentage)),
        );

        let reloaded = parse_cells_content(&write_cells_content(&store)).unwrap();
        assert_eq!(reloaded, store);
    }
}
