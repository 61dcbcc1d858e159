//! The task bank: levels, tasks, preloaded datasets and their criteria.
//!
//! Banks are TOML documents (see `data/tasks.toml` for the built-in one):
//!
//! ```toml
//! [[levels]]
//! number = 1
//! title = "Excel Basics"
//!
//! [[levels.tasks]]
//! id = 2
//! title = "Weekly Sales Total"
//! instructions = "Use SUM in A6 to total A1:A5."
//!
//! [levels.tasks.cells]
//! A1 = "10"
//!
//! [levels.tasks.criteria]
//! expected_formula = "=SUM(A1:A5)"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use cellcraft_engine::engine::{Cell, CellRef, CellStore};
use log::debug;
use serde::Deserialize;

use crate::error::{CellcraftError, Result};
use crate::validate::ValidationCriteria;

const BUILTIN_TASKS: &str = include_str!("../data/tasks.toml");

/// Identifies a task as `<level>-<task>`, e.g. `3-8`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TaskKey {
    pub level: u32,
    pub task: u32,
}

impl TaskKey {
    pub fn new(level: u32, task: u32) -> TaskKey {
        TaskKey { level, task }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.level, self.task)
    }
}

impl FromStr for TaskKey {
    type Err = CellcraftError;

    fn from_str(s: &str) -> Result<TaskKey> {
        let invalid = || CellcraftError::InvalidTaskKey(s.to_string());
        let (level, task) = s.trim().split_once('-').ok_or_else(invalid)?;
        let level = level.parse().map_err(|_| invalid())?;
        let task = task.parse().map_err(|_| invalid())?;
        Ok(TaskKey { level, task })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Task {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub scenario: String,
    pub instructions: String,
    /// Suggested time in seconds. Informational only.
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub hints: Vec<String>,
    /// Cells preloaded when the task starts.
    #[serde(default)]
    pub cells: BTreeMap<CellRef, String>,
    #[serde(default)]
    pub criteria: ValidationCriteria,
}

impl Task {
    /// Fresh store holding this task's preloaded cells.
    pub fn dataset(&self) -> CellStore {
        self.cells
            .iter()
            .map(|(cell_ref, value)| (*cell_ref, Cell::new_value(value)))
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Level {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TaskBank {
    levels: Vec<Level>,
}

impl TaskBank {
    /// The bank compiled into the binary.
    pub fn builtin() -> Result<TaskBank> {
        TaskBank::from_toml_str(BUILTIN_TASKS)
    }

    /// Load a bank from a TOML file.
    pub fn load(path: &Path) -> Result<TaskBank> {
        let content = fs::read_to_string(path)?;
        let bank = TaskBank::from_toml_str(&content)?;
        debug!("loaded {} tasks from {}", bank.len(), path.display());
        Ok(bank)
    }

    pub fn from_toml_str(content: &str) -> Result<TaskBank> {
        let bank: TaskBank = toml::from_str(content)?;

        let mut seen = HashSet::new();
        for key in bank.keys() {
            if !seen.insert(key) {
                return Err(CellcraftError::DuplicateTask(key.to_string()));
            }
        }
        Ok(bank)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, number: u32) -> Option<&Level> {
        self.levels.iter().find(|level| level.number == number)
    }

    pub fn task(&self, key: TaskKey) -> Option<&Task> {
        self.level(key.level)?
            .tasks
            .iter()
            .find(|task| task.id == key.task)
    }

    /// Preloaded cells for a task; empty when the task has none or is unknown.
    pub fn dataset(&self, key: TaskKey) -> CellStore {
        self.task(key).map(Task::dataset).unwrap_or_default()
    }

    /// Every task key, in bank order.
    pub fn keys(&self) -> impl Iterator<Item = TaskKey> + '_ {
        self.levels.iter().flat_map(|level| {
            level
                .tasks
                .iter()
                .map(move |task| TaskKey::new(level.number, task.id))
        })
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(|level| level.tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    #[test]
    fn test_task_key_roundtrip() {
        let key: TaskKey = "3-8".parse().unwrap();
        assert_eq!(key, TaskKey::new(3, 8));
        assert_eq!(key.to_string(), "3-8");
        assert!("3".parse::<TaskKey>().is_err());
        assert!("a-1".parse::<TaskKey>().is_err());
        assert!("1-".parse::<TaskKey>().is_err());
    }

    #[test]
    fn test_builtin_bank_loads() {
        let bank = TaskBank::builtin().unwrap();
        let numbers: Vec<u32> = bank.levels().iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 3, 5, 7]);
        assert_eq!(bank.len(), 40);
        assert!(bank.levels().iter().all(|l| l.tasks.len() == 10));
    }

    #[test]
    fn test_builtin_datasets() {
        let bank = TaskBank::builtin().unwrap();

        let sales = bank.dataset(TaskKey::new(1, 2));
        assert_eq!(sales.len(), 5);
        assert_eq!(sales.value(&cell("A1")), Some("10"));
        assert_eq!(sales.value(&cell("A5")), Some("25"));

        let scores = bank.dataset(TaskKey::new(5, 9));
        assert_eq!(scores.value(&cell("H7")), Some("56"));

        assert!(bank.dataset(TaskKey::new(1, 1)).is_empty());
        assert!(bank.dataset(TaskKey::new(9, 9)).is_empty());
    }

    #[test]
    fn test_builtin_criteria() {
        let bank = TaskBank::builtin().unwrap();
        let task = bank.task(TaskKey::new(3, 8)).unwrap();
        assert_eq!(
            task.criteria.expected_formula.as_deref(),
            Some(r#"=IF(G1>20,"High",IF(G1>10,"Medium","Low"))"#)
        );

        let task = bank.task(TaskKey::new(1, 1)).unwrap();
        let expected = task.criteria.expected_cell_value.as_ref().unwrap();
        assert_eq!(expected.cell, cell("B1"));

        let task = bank.task(TaskKey::new(5, 5)).unwrap();
        assert_eq!(
            task.criteria.custom_validation.as_deref(),
            Some("data-validation-D1")
        );
    }

    #[test]
    fn test_duplicate_tasks_rejected() {
        let content = r#"
[[levels]]
number = 1
title = "One"

[[levels.tasks]]
id = 1
title = "a"
instructions = "x"

[[levels.tasks]]
id = 1
title = "b"
instructions = "y"
"#;
        assert!(matches!(
            TaskBank::from_toml_str(content),
            Err(CellcraftError::DuplicateTask(key)) if key == "1-1"
        ));
    }

    #[test]
    fn test_invalid_cell_in_dataset_rejected() {
        let content = r#"
[[levels]]
number = 1
title = "One"

[[levels.tasks]]
id = 1
title = "a"
instructions = "x"

[levels.tasks.cells]
"1A" = "3"
"#;
        assert!(matches!(
            TaskBank::from_toml_str(content),
            Err(CellcraftError::TaskBank(_))
        ));
    }
}
