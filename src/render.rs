//! Plain-text rendering of the grid, tasks and help.

use cellcraft_core::{CellRef, Task, TaskBank, TaskSession};
use cellcraft_engine::builtins::BUILTINS;

/// Columns A..I.
pub const GRID_COLS: usize = 9;
/// Rows 1..10.
pub const GRID_ROWS: usize = 10;

const COL_WIDTH: usize = 10;
const ROW_HEADER_WIDTH: usize = 3;

/// Formula bar plus the visible grid. The selected cell is marked with `>`.
pub fn render_grid(session: &TaskSession) -> String {
    let selected = session.selected();
    let mut out = String::new();

    let bar = session.formula_bar();
    if bar.is_empty() {
        out.push_str(&format!("{}: (empty)\n", selected));
    } else {
        out.push_str(&format!("{}: {}\n", selected, bar));
    }

    out.push_str(&" ".repeat(ROW_HEADER_WIDTH));
    for col in 0..GRID_COLS {
        out.push_str(&format!(" {:<width$}", CellRef::col_to_letters(col), width = COL_WIDTH));
    }
    out.push('\n');

    for row in 0..GRID_ROWS {
        out.push_str(&format!("{:>width$}", row + 1, width = ROW_HEADER_WIDTH));
        for col in 0..GRID_COLS {
            let cell_ref = CellRef::new(col, row);
            let marker = if cell_ref == selected { '>' } else { ' ' };
            let display = fit(&session.display_value(&cell_ref), COL_WIDTH);
            out.push_str(&format!("{}{:<width$}", marker, display, width = COL_WIDTH));
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }
    out
}

/// Truncate to `width` characters, marking the cut with `~`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('~');
    cut
}

/// Task heading, instructions, and (optionally) scenario and hints.
pub fn render_task(key: &str, task: &Task, show_hints: bool) -> String {
    let mut out = format!("Task {}: {}\n", key, task.title);
    if show_hints && !task.scenario.is_empty() {
        out.push_str(&format!("{}\n", task.scenario));
    }
    out.push_str(&format!("{}\n", task.instructions));
    if let Some(target) = task.criteria.target_cell() {
        out.push_str(&format!("Target cell: {}\n", target));
    }
    if let Some(limit) = task.time_limit {
        out.push_str(&format!("Suggested time: {}s\n", limit));
    }
    if show_hints {
        out.push_str(&render_hints(task));
    }
    out
}

pub fn render_hints(task: &Task) -> String {
    task.hints
        .iter()
        .enumerate()
        .map(|(i, hint)| format!("  hint {}: {}\n", i + 1, hint))
        .collect()
}

pub fn render_task_list(bank: &TaskBank) -> String {
    let mut out = String::new();
    for level in bank.levels() {
        out.push_str(&format!("Level {}: {}\n", level.number, level.title));
        for task in &level.tasks {
            out.push_str(&format!("  {}-{:<3} {}\n", level.number, task.id, task.title));
        }
    }
    out
}

pub fn render_functions() -> String {
    BUILTINS
        .iter()
        .map(|builtin| format!("{:<12} {}\n", builtin.sheet_name, builtin.description))
        .collect()
}

pub fn help_text() -> &'static str {
    "\
Commands:
  CELL              Select a cell (e.g. B5)
  CELL INPUT        Enter a value or =formula into a cell
  :select CELL      Select a cell
  :format CELL FMT  Set format: text, number, currency, percentage
  :show             Redraw the grid
  :check            Check the task against the current cells
  :hint             Show the task's hints
  :task             Show the task again
  :save [FILE]      Save cells to a file
  :load FILE        Load cells from a file
  :help             Show this help
  :quit             Leave the task
"
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellcraft_core::TaskKey;

    #[test]
    fn test_fit() {
        assert_eq!(fit("short", 10), "short");
        assert_eq!(fit("exactly10!", 10), "exactly10!");
        assert_eq!(fit("much too long", 10), "much too ~");
    }

    #[test]
    fn test_render_grid_shows_values_and_selection() {
        let mut session = TaskSession::new(TaskBank::builtin().unwrap());
        session.start_task(TaskKey::new(1, 2)).unwrap();
        session.submit(CellRef::new(0, 5), "=SUM(A1:A5)");

        let grid = render_grid(&session);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[0], "A6: =SUM(A1:A5)");
        assert!(lines[1].contains('A') && lines[1].trim_end().ends_with('I'));
        assert_eq!(lines[2].trim_end(), "  1 10");
        assert_eq!(lines[7].trim_end(), "  6>100");
        assert_eq!(lines.len(), 1 + 1 + GRID_ROWS);
    }

    #[test]
    fn test_render_task_names_target_cell() {
        let bank = TaskBank::builtin().unwrap();

        let task = bank.task(TaskKey::new(1, 1)).unwrap();
        let text = render_task("1-1", task, false);
        assert!(text.starts_with(&format!("Task 1-1: {}\n", task.title)));
        assert!(text.contains("Target cell: B1\n"));

        // Formula-only criteria do not name a cell.
        let task = bank.task(TaskKey::new(3, 8)).unwrap();
        assert!(!render_task("3-8", task, false).contains("Target cell"));
    }

    #[test]
    fn test_task_list_and_functions() {
        let bank = TaskBank::builtin().unwrap();
        let list = render_task_list(&bank);
        assert!(list.contains("Level 3: Advanced Excel Formulas"));
        assert!(list.contains("  3-8   Performance Rating System"));
        assert!(render_functions().contains("SUMIF"));
    }
}
