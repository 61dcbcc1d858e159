//! Cellcraft formula engine.
//!
//! Evaluates spreadsheet formulas (`=SUM(A1:A5)`, `=IF(G1>10,"High","Low")`)
//! against a sparse [`CellStore`](engine::CellStore). Formulas are tokenized
//! and parsed into a small expression tree; only cell references, ranges,
//! literals, arithmetic, comparisons and the fixed built-ins in [`builtins`]
//! are expressible.

pub mod builtins;
pub mod engine;
pub mod error;

pub use engine::{Cell, CellFormat, CellRange, CellRef, CellStore, evaluate_formula};
pub use error::{ERROR_SENTINEL, EvalError, EvalResult};
