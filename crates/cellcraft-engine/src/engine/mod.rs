//! Formula engine API.
//!
//! - [`Cell`], [`CellFormat`], [`CellStore`] - Cell storage
//! - [`CellRef`], [`CellRange`] - A1 references and rectangular ranges
//! - [`evaluate_formula`] - Evaluate a formula to its display string
//! - [`parse_expression`], [`tokenize`] - Formula front end
//! - [`format_number`], [`currency_string`] - Value rendering

mod cell;
mod cell_ref;
pub(crate) mod eval;
pub(crate) mod format;
mod lexer;
pub(crate) mod parser;
mod range;
pub(crate) mod value;

pub use cell::{Cell, CellFormat, CellStore};
pub use cell_ref::CellRef;
pub use eval::{MAX_RANGE_CELLS, evaluate_formula, try_evaluate_formula};
pub use format::{currency_string, fixed_decimal_string, format_number, group_thousands};
pub use lexer::{Token, tokenize};
pub use parser::{BinaryOp, Expr, MAX_TOKENS, parse_expression};
pub use range::{CellRange, expand_range, expand_range_ids};
pub use value::{Value, parse_number};
