//! cellcraft-core - UI-agnostic task bank, validation, play session + storage.

pub mod error;
pub mod session;
pub mod storage;
pub mod tasks;
pub mod validate;

pub use error::{CellcraftError, Result};
pub use session::TaskSession;
pub use tasks::{Level, Task, TaskBank, TaskKey};
pub use validate::{
    ExpectedCellValue, ExpectedFormatting, ExpectedRange, RangeOperation, ValidationCriteria,
};

pub use cellcraft_engine::engine::{Cell, CellFormat, CellRef, CellStore};
