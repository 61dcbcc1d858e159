//! Cell file storage.
//!
//! One cell per line, `CELL: VALUE`, with an optional format tag on the key:
//!
//! ```text
//! # Cellcraft cells
//! A1: 10
//! A2: "Total"
//! B1[currency]: 2450.75
//! A3: =SUM(A1:A2)
//! ```
//!
//! Text is quoted (`\"` and `\\` escape), numbers are bare, formulas keep
//! their leading `=`. Blank lines and `#` comments are skipped.

mod parser;
mod writer;

pub use parser::{parse_cells, parse_cells_content};
pub use writer::{write_cells, write_cells_content};
