use std::path::PathBuf;

use cellcraft_engine::engine::{CellRef, CellStore};
use log::info;

use crate::error::{CellcraftError, Result};
use crate::tasks::{Task, TaskBank, TaskKey};

/// The grid a player works in, bound to the active task.
///
/// The session owns the only mutable [`CellStore`]. Every edit goes through
/// [`submit`](TaskSession::submit) or [`apply_format`](TaskSession::apply_format),
/// which return the task's validation outcome for the new state.
pub struct TaskSession {
    pub(crate) bank: TaskBank,
    pub(crate) active: Option<TaskKey>,
    pub(crate) cells: CellStore,
    pub(crate) selected: CellRef,
    /// Where `:save` writes when no path is given.
    pub file_path: Option<PathBuf>,
    /// Whether cells changed since the task started or was last saved/loaded.
    pub modified: bool,
}

impl TaskSession {
    /// A session with no active task and an empty grid.
    pub fn new(bank: TaskBank) -> Self {
        TaskSession {
            bank,
            active: None,
            cells: CellStore::new(),
            selected: home(),
            file_path: None,
            modified: false,
        }
    }

    /// Make `key` the active task: the grid is replaced by the task's
    /// dataset (or emptied) and `A1` is selected.
    pub fn start_task(&mut self, key: TaskKey) -> Result<&Task> {
        let task = self
            .bank
            .task(key)
            .ok_or_else(|| CellcraftError::UnknownTask(key.to_string()))?;
        info!("starting task {} ({})", key, task.title);

        self.cells.reset(task.dataset());
        self.active = Some(key);
        self.selected = home();
        self.modified = false;
        Ok(task)
    }

    pub fn bank(&self) -> &TaskBank {
        &self.bank
    }

    pub fn active_key(&self) -> Option<TaskKey> {
        self.active
    }

    pub fn task(&self) -> Option<&Task> {
        self.bank.task(self.active?)
    }

    pub fn cells(&self) -> &CellStore {
        &self.cells
    }

    pub fn select(&mut self, cell: CellRef) {
        self.selected = cell;
    }

    pub fn selected(&self) -> CellRef {
        self.selected
    }

    /// What the formula bar shows for the selected cell: its formula, else
    /// its value, else nothing.
    pub fn formula_bar(&self) -> &str {
        self.cells
            .get(&self.selected)
            .map_or("", |cell| cell.to_input_string())
    }

    /// Whether the current grid completes the active task.
    pub fn is_valid(&self) -> bool {
        self.task()
            .is_some_and(|task| task.criteria.check(&self.cells, &self.selected))
    }
}

fn home() -> CellRef {
    CellRef::new(0, 0)
}
