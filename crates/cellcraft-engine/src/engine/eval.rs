//! Formula evaluation against a cell store.
//!
//! Evaluation is one-shot: referenced cells contribute their current stored
//! value strings, and no other cell's formula is re-run. All failures surface
//! to callers of [`evaluate_formula`] as the `#ERROR` sentinel; the typed
//! error is available through [`try_evaluate_formula`].

use log::debug;

use super::cell::CellStore;
use super::cell_ref::CellRef;
use super::parser::{BinaryOp, Expr, parse_expression};
use super::range::CellRange;
use super::value::{Value, parse_number};
use crate::builtins;
use crate::error::{ERROR_SENTINEL, EvalError, EvalResult};

/// Largest range a single argument may expand to.
pub const MAX_RANGE_CELLS: usize = 100_000;

/// Evaluate a formula (text beginning with `=`) and render the display string.
/// Never fails: any error becomes `#ERROR`.
pub fn evaluate_formula(formula: &str, cells: &CellStore) -> String {
    match try_evaluate_formula(formula, cells) {
        Ok(value) => value.render(),
        Err(err) => {
            debug!("formula {:?} failed: {}", formula, err);
            ERROR_SENTINEL.to_string()
        }
    }
}

/// Evaluate a formula, keeping the typed result or error.
pub fn try_evaluate_formula(formula: &str, cells: &CellStore) -> EvalResult<Value> {
    let body = formula
        .trim_start()
        .strip_prefix('=')
        .ok_or(EvalError::MissingEquals)?;
    let expr = parse_expression(body)?;
    Evaluator::new(cells).eval(&expr)
}

/// Walks an expression tree with read access to the store.
pub(crate) struct Evaluator<'a> {
    cells: &'a CellStore,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(cells: &'a CellStore) -> Self {
        Evaluator { cells }
    }

    /// Raw stored value of a cell, `""` when absent.
    pub(crate) fn raw(&self, cell: &CellRef) -> &'a str {
        self.cells.value(cell).unwrap_or("")
    }

    pub(crate) fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Text(s) => Ok(Value::Text(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Cell(cell) => Ok(Value::from_cell(self.cells.value(cell))),
            Expr::Range(range) => Err(EvalError::Parse(format!(
                "Range {} is only valid as a function argument",
                range
            ))),
            Expr::Call { name, args } => builtins::call(self, name, args),
            Expr::Neg(inner) => Ok(Value::Number(-self.number_operand(inner)?)),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(Value::Bool(compare(*op, &left, &right)))
            }
            Expr::Chain { first, rest } => {
                let mut acc = self.number_operand(first)?;
                for (op, operand) in rest {
                    let r = self.number_operand(operand)?;
                    acc = arithmetic(*op, acc, r)?;
                }
                Ok(Value::Number(acc))
            }
        }
    }

    /// Operand of an arithmetic operator. A cell reference contributes its
    /// numeric value, or zero when absent, empty, or non-numeric.
    pub(crate) fn number_operand(&self, expr: &Expr) -> EvalResult<f64> {
        if let Expr::Cell(cell) = expr {
            return Ok(parse_number(self.raw(cell)).unwrap_or(0.0));
        }
        let value = self.eval(expr)?;
        value
            .as_number()
            .ok_or_else(|| EvalError::NotANumber(value.as_text()))
    }

    /// Numeric argument that must really be a number: absent cells read as
    /// zero, but non-numeric text is an error.
    pub(crate) fn strict_number(&self, expr: &Expr) -> EvalResult<f64> {
        let value = self.eval(expr)?;
        value
            .as_number()
            .ok_or_else(|| EvalError::NotANumber(value.as_text()))
    }

    /// Evaluate an argument as text (`""` for an absent cell).
    pub(crate) fn text(&self, expr: &Expr) -> EvalResult<String> {
        Ok(self.eval(expr)?.as_text())
    }

    /// Cells addressed by a range argument. A single cell reference counts as
    /// a one-cell range; anything else is rejected.
    pub(crate) fn range_cells(
        &self,
        function: &'static str,
        expr: &Expr,
    ) -> EvalResult<Vec<CellRef>> {
        match expr {
            Expr::Range(range) => {
                check_range_size(range)?;
                Ok(range.cells().collect())
            }
            Expr::Cell(cell) => Ok(vec![*cell]),
            _ => Err(EvalError::invalid_arg(function, "expected a cell range")),
        }
    }

    /// Numbers contributed by aggregate arguments. Range and cell arguments
    /// read absent or empty cells as 0 and drop non-numeric cells; other
    /// arguments must evaluate to numbers.
    pub(crate) fn collect_numbers(
        &self,
        function: &'static str,
        args: &[Expr],
    ) -> EvalResult<Vec<f64>> {
        let mut numbers = Vec::new();
        for arg in args {
            match arg {
                Expr::Range(_) | Expr::Cell(_) => {
                    for cell in self.range_cells(function, arg)? {
                        let raw = self.raw(&cell);
                        let raw = if raw.is_empty() { "0" } else { raw };
                        if let Some(n) = parse_number(raw) {
                            numbers.push(n);
                        }
                    }
                }
                other => numbers.push(self.strict_number(other)?),
            }
        }
        Ok(numbers)
    }
}

fn arithmetic(op: BinaryOp, l: f64, r: f64) -> EvalResult<f64> {
    let result = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            l / r
        }
        _ => unreachable!("the parser only chains + - * /"),
    };
    if !result.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(result)
}

fn check_range_size(range: &CellRange) -> EvalResult<()> {
    if range.len() > MAX_RANGE_CELLS {
        return Err(EvalError::RangeTooLarge(range.to_string()));
    }
    Ok(())
}

/// Compare numerically when both sides read as numbers, otherwise as text.
fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    use std::cmp::Ordering;

    let ordering = match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => Some(left.as_text().cmp(&right.as_text())),
    };
    let Some(ordering) = ordering else {
        return false;
    };

    match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Ne => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => false,
    }
}
