use cellcraft_engine::engine::{Cell, CellFormat, CellRef, evaluate_formula, fixed_decimal_string, parse_number};
use log::debug;

use super::TaskSession;

impl TaskSession {
    /// Enter `input` into `cell`, as if typed into the formula bar.
    ///
    /// Input starting with `=` is evaluated against the grid as it was before
    /// this edit and stored with its formula; anything else is stored as a
    /// literal. The cell keeps its format (`text` when it had none) and
    /// becomes the selection. Other formula cells are not re-evaluated.
    ///
    /// Returns whether the task is now complete.
    pub fn submit(&mut self, cell: CellRef, input: &str) -> bool {
        let format = Some(self.format_or_text(&cell));
        let new_cell = if input.starts_with('=') {
            let value = evaluate_formula(input, &self.cells);
            debug!("{} {} -> {}", cell, input, value);
            Cell::new_formula(input, &value)
        } else {
            Cell::new_value(input)
        };

        self.cells.set(cell, new_cell.with_format(format));
        self.selected = cell;
        self.modified = true;
        self.is_valid()
    }

    /// Set the display format of `cell`, keeping its value and formula.
    /// Returns whether the task is now complete.
    pub fn apply_format(&mut self, cell: CellRef, format: CellFormat) -> bool {
        let updated = self
            .cells
            .get(&cell)
            .cloned()
            .unwrap_or_default()
            .with_format(Some(format));
        self.cells.set(cell, updated);
        self.modified = true;
        self.is_valid()
    }

    /// The cell as the grid renders it. Numeric formats read non-numeric
    /// values as 0; absent cells render empty.
    pub fn display_value(&self, cell: &CellRef) -> String {
        let Some(cell) = self.cells.get(cell) else {
            return String::new();
        };
        let number = || parse_number(&cell.value).unwrap_or(0.0);

        match cell.format {
            Some(CellFormat::Currency) => format!("${}", fixed_decimal_string(number(), 2)),
            Some(CellFormat::Percentage) => {
                format!("{}%", fixed_decimal_string(number() * 100.0, 2))
            }
            Some(CellFormat::Number) => fixed_decimal_string(number(), 2),
            Some(CellFormat::Text) | None => cell.value.clone(),
        }
    }

    fn format_or_text(&self, cell: &CellRef) -> CellFormat {
        self.cells
            .get(cell)
            .and_then(|cell| cell.format)
            .unwrap_or(CellFormat::Text)
    }
}
