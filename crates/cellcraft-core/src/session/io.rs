use std::path::{Path, PathBuf};

use log::info;

use super::TaskSession;
use crate::error::{CellcraftError, Result};
use crate::storage::{parse_cells, write_cells};

impl TaskSession {
    /// Replace the grid with the cells stored in `path`. The active task and
    /// selection are kept so the loaded cells can complete it.
    pub fn load_cells(&mut self, path: &Path) -> Result<usize> {
        let cells = parse_cells(path)?;
        let count = cells.len();
        self.cells.reset(cells);
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        info!("loaded {} cells from {}", count, path.display());
        Ok(count)
    }

    /// Write the grid to `path`, or to the last used path when `None`.
    /// Returns the path written.
    pub fn save_cells(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => self
                .file_path
                .clone()
                .ok_or(CellcraftError::NoFilePath)?,
        };
        write_cells(&path, &self.cells)?;
        self.file_path = Some(path.clone());
        self.modified = false;
        info!("saved {} cells to {}", self.cells.len(), path.display());
        Ok(path)
    }
}
