//! Parser for cell files.

use crate::error::{CellcraftError, Result};
use cellcraft_engine::engine::{Cell, CellFormat, CellRef, CellStore, evaluate_formula, parse_number};
use log::debug;
use std::fs;
use std::path::Path;

/// Parse a cell file and return its cells.
pub fn parse_cells(path: &Path) -> Result<CellStore> {
    let content = fs::read_to_string(path)?;
    parse_cells_content(&content)
}

/// Parse cell file content from a string.
///
/// Formula values are not stored in the file. They are evaluated once, in
/// row-major order, after all literal cells are in place, so a formula sees
/// literals anywhere and the results of formulas above or left of it.
pub fn parse_cells_content(content: &str) -> Result<CellStore> {
    let mut store = CellStore::new();
    let mut formulas = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(CellcraftError::Parse {
                line: line_num,
                message: "Expected 'CELL: VALUE' format".to_string(),
            });
        };

        let (cell_ref, format) = parse_key(key.trim(), line_num)?;
        let value = value.trim();

        if value.starts_with('=') {
            formulas.push((cell_ref, value.to_string(), format));
            continue;
        }

        let literal = parse_literal(value, line_num)?;
        store.set(cell_ref, Cell::new_value(&literal).with_format(format));
    }

    formulas.sort_by_key(|(cell_ref, _, _)| *cell_ref);
    for (cell_ref, formula, format) in formulas {
        let value = evaluate_formula(&formula, &store);
        debug!("loaded {} {} -> {}", cell_ref, formula, value);
        store.set(cell_ref, Cell::new_formula(&formula, &value).with_format(format));
    }

    Ok(store)
}

/// `A1` or `A1[currency]`.
fn parse_key(key: &str, line_num: usize) -> Result<(CellRef, Option<CellFormat>)> {
    let (cell_str, format) = match key.split_once('[') {
        Some((cell_str, rest)) => {
            let tag = rest.strip_suffix(']').ok_or_else(|| CellcraftError::Parse {
                line: line_num,
                message: format!("Unclosed format tag: {}", key),
            })?;
            let format = tag.parse::<CellFormat>().map_err(|message| CellcraftError::Parse {
                line: line_num,
                message,
            })?;
            (cell_str.trim(), Some(format))
        }
        None => (key, None),
    };

    let cell_ref = CellRef::from_str(cell_str).ok_or_else(|| CellcraftError::Parse {
        line: line_num,
        message: format!("Invalid cell reference: {}", cell_str),
    })?;
    Ok((cell_ref, format))
}

fn parse_literal(value: &str, line_num: usize) -> Result<String> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return Ok(unescape_text(&value[1..value.len() - 1]));
    }

    if parse_number(value).is_some() {
        return Ok(value.to_string());
    }

    Err(CellcraftError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
