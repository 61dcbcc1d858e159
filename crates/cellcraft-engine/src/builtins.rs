//! Built-in spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Function names are ALL CAPS and matched case-insensitively (the lexer
//!   uppercases identifiers).
//! - Each entry declares its arity; argument counts are checked before the
//!   implementation runs.
//! - To add a function, add a [`Builtin`] entry to [`BUILTINS`] pointing at
//!   its implementation below.

use chrono::Local;
use log::debug;

use crate::engine::eval::Evaluator;
use crate::engine::format::{currency_string, fixed_decimal_string, format_number};
use crate::engine::parser::Expr;
use crate::engine::value::{Value, parse_number};
use crate::error::{ERROR_SENTINEL, EvalError, EvalResult};

type BuiltinFn = fn(&Evaluator<'_>, &[Expr]) -> EvalResult<Value>;

pub struct Builtin {
    pub sheet_name: &'static str,
    pub min_args: usize,
    /// `None` for variadic functions.
    pub max_args: Option<usize>,
    pub description: &'static str,
    eval: BuiltinFn,
}

impl Builtin {
    fn arity_text(&self) -> &'static str {
        match (self.min_args, self.max_args) {
            (0, Some(0)) => "0",
            (1, Some(1)) => "1",
            (1, Some(2)) => "1 or 2",
            (2, Some(2)) => "2",
            (2, Some(3)) => "2 or 3",
            (1, None) => "at least 1",
            _ => "a different number",
        }
    }
}

pub static BUILTINS: &[Builtin] = &[
    Builtin {
        sheet_name: "SUM",
        min_args: 1,
        max_args: None,
        description: "Sum of numeric values in a cell range",
        eval: sum,
    },
    Builtin {
        sheet_name: "AVERAGE",
        min_args: 1,
        max_args: None,
        description: "Average of numeric values in a cell range",
        eval: average,
    },
    Builtin {
        sheet_name: "COUNT",
        min_args: 1,
        max_args: None,
        description: "Count of numeric cells in a cell range",
        eval: count,
    },
    Builtin {
        sheet_name: "MAX",
        min_args: 1,
        max_args: None,
        description: "Maximum numeric value in a cell range",
        eval: max,
    },
    Builtin {
        sheet_name: "MIN",
        min_args: 1,
        max_args: None,
        description: "Minimum numeric value in a cell range",
        eval: min,
    },
    Builtin {
        sheet_name: "IF",
        min_args: 2,
        max_args: Some(3),
        description: "Pick one of two values depending on a condition",
        eval: if_fn,
    },
    Builtin {
        sheet_name: "COUNTIF",
        min_args: 2,
        max_args: Some(2),
        description: "Count cells equal to the criteria text",
        eval: countif,
    },
    Builtin {
        sheet_name: "SUMIF",
        min_args: 2,
        max_args: Some(3),
        description: "Sum cells matching the criteria (\">N\" or exact text)",
        eval: sumif,
    },
    Builtin {
        sheet_name: "CONCATENATE",
        min_args: 1,
        max_args: None,
        description: "Join text values with no separator",
        eval: concatenate,
    },
    Builtin {
        sheet_name: "LEFT",
        min_args: 1,
        max_args: Some(2),
        description: "First N characters of a text value",
        eval: left,
    },
    Builtin {
        sheet_name: "UPPER",
        min_args: 1,
        max_args: Some(1),
        description: "Uppercase a text value",
        eval: upper,
    },
    Builtin {
        sheet_name: "LEN",
        min_args: 1,
        max_args: Some(1),
        description: "Number of characters in a text value",
        eval: len,
    },
    Builtin {
        sheet_name: "TODAY",
        min_args: 0,
        max_args: Some(0),
        description: "Current local date",
        eval: today,
    },
    Builtin {
        sheet_name: "ROUND",
        min_args: 2,
        max_args: Some(2),
        description: "Round a number to a fixed number of decimals",
        eval: round,
    },
    Builtin {
        sheet_name: "MEDIAN",
        min_args: 1,
        max_args: None,
        description: "Middle value of the numeric cells in a range",
        eval: median,
    },
    Builtin {
        sheet_name: "COUNTA",
        min_args: 1,
        max_args: None,
        description: "Count of non-empty cells in a range",
        eval: counta,
    },
    Builtin {
        sheet_name: "TEXT",
        min_args: 2,
        max_args: Some(2),
        description: "Render a number with a format (\"$\" formats as currency)",
        eval: text,
    },
    Builtin {
        sheet_name: "IFERROR",
        min_args: 2,
        max_args: Some(2),
        description: "Fallback value when a calculation fails",
        eval: iferror,
    },
];

/// Most decimals ROUND accepts.
const MAX_DECIMALS: usize = 15;

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.sheet_name == name)
}

/// Check arity and dispatch a call.
pub(crate) fn call(ev: &Evaluator<'_>, name: &str, args: &[Expr]) -> EvalResult<Value> {
    let builtin = lookup(name).ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;

    let too_few = args.len() < builtin.min_args;
    let too_many = builtin.max_args.is_some_and(|max| args.len() > max);
    if too_few || too_many {
        return Err(EvalError::ArgumentCount {
            function: builtin.sheet_name,
            expected: builtin.arity_text(),
            actual: args.len(),
        });
    }

    (builtin.eval)(ev, args)
}

fn sum(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let values = ev.collect_numbers("SUM", args)?;
    Ok(Value::Number(values.iter().sum()))
}

fn average(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let values = ev.collect_numbers("AVERAGE", args)?;
    if values.is_empty() {
        return Ok(Value::Number(0.0));
    }
    Ok(Value::Number(values.iter().sum::<f64>() / values.len() as f64))
}

fn count(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let values = ev.collect_numbers("COUNT", args)?;
    Ok(Value::Number(values.len() as f64))
}

fn max(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let values = ev.collect_numbers("MAX", args)?;
    Ok(Value::Number(
        values.into_iter().reduce(f64::max).unwrap_or(0.0),
    ))
}

fn min(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let values = ev.collect_numbers("MIN", args)?;
    Ok(Value::Number(
        values.into_iter().reduce(f64::min).unwrap_or(0.0),
    ))
}

fn median(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let mut values = ev.collect_numbers("MEDIAN", args)?;
    if values.is_empty() {
        return Ok(Value::Number(0.0));
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };
    Ok(Value::Number(median))
}

fn counta(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let mut total = 0usize;
    for arg in args {
        total += ev
            .range_cells("COUNTA", arg)?
            .iter()
            .filter(|cell| !ev.raw(cell).is_empty())
            .count();
    }
    Ok(Value::Number(total as f64))
}

fn countif(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let cells = ev.range_cells("COUNTIF", &args[0])?;
    let criteria = ev.text(&args[1])?;
    let matches = cells
        .iter()
        .filter(|cell| ev.raw(cell) == criteria)
        .count();
    Ok(Value::Number(matches as f64))
}

/// SUMIF criteria: `>N` is a numeric threshold, anything else matches exactly.
enum Criteria {
    GreaterThan(Option<f64>),
    Equals(String),
}

impl Criteria {
    fn parse(text: String) -> Criteria {
        if let Some(threshold) = text.strip_prefix('>') {
            return Criteria::GreaterThan(parse_number(threshold));
        }
        Criteria::Equals(text)
    }

    fn matches(&self, raw: &str) -> bool {
        match self {
            // An unparsable threshold or cell behaves like a NaN comparison.
            Criteria::GreaterThan(threshold) => match (parse_number(raw), threshold) {
                (Some(n), Some(t)) => n > *t,
                _ => false,
            },
            Criteria::Equals(expected) => raw == expected,
        }
    }
}

fn sumif(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let cells = ev.range_cells("SUMIF", &args[0])?;
    let criteria = Criteria::parse(ev.text(&args[1])?);
    let sum_cells = match args.get(2) {
        Some(sum_range) => {
            let sum_cells = ev.range_cells("SUMIF", sum_range)?;
            if sum_cells.len() != cells.len() {
                return Err(EvalError::invalid_arg(
                    "SUMIF",
                    "sum range must be the same size as the criteria range",
                ));
            }
            sum_cells
        }
        None => cells.clone(),
    };

    let total: f64 = cells
        .iter()
        .zip(&sum_cells)
        .filter(|(cell, _)| criteria.matches(ev.raw(cell)))
        .map(|(_, sum_cell)| parse_number(ev.raw(sum_cell)).unwrap_or(0.0))
        .sum();
    Ok(Value::Number(total))
}

/// Branches are evaluated as expressions, so nested IFs work and string
/// literals come back with their original case.
fn if_fn(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let condition = match ev.eval(&args[0]) {
        Ok(value) => value.is_truthy(),
        Err(err) => {
            debug!("IF condition failed, treating as false: {}", err);
            false
        }
    };

    if condition {
        ev.eval(&args[1])
    } else {
        match args.get(2) {
            Some(otherwise) => ev.eval(otherwise),
            None => Ok(Value::Bool(false)),
        }
    }
}

/// Falls back on any failure of the inner expression, including a referenced
/// cell that already displays `#ERROR`.
fn iferror(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    match ev.eval(&args[0]) {
        Ok(Value::Text(s)) if s == ERROR_SENTINEL => ev.eval(&args[1]),
        Ok(value) => Ok(value),
        Err(err) => {
            debug!("IFERROR caught: {}", err);
            ev.eval(&args[1])
        }
    }
}

fn concatenate(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let mut joined = String::new();
    for arg in args {
        joined.push_str(&ev.text(arg)?);
    }
    Ok(Value::Text(joined))
}

fn left(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let text = ev.text(&args[0])?;
    let count = match args.get(1) {
        Some(n) => non_negative_int("LEFT", ev.strict_number(n)?)?,
        None => 1,
    };
    Ok(Value::Text(text.chars().take(count).collect()))
}

fn upper(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Text(ev.text(&args[0])?.to_uppercase()))
}

fn len(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Number(ev.text(&args[0])?.chars().count() as f64))
}

fn today(_ev: &Evaluator<'_>, _args: &[Expr]) -> EvalResult<Value> {
    Ok(Value::Text(Local::now().format("%-m/%-d/%Y").to_string()))
}

fn round(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let n = ev.strict_number(&args[0])?;
    let decimals = non_negative_int("ROUND", ev.strict_number(&args[1])?)?;
    if decimals > MAX_DECIMALS {
        return Err(EvalError::invalid_arg(
            "ROUND",
            format!("decimals must be <= {}", MAX_DECIMALS),
        ));
    }
    Ok(Value::Text(fixed_decimal_string(n, decimals)))
}

fn text(ev: &Evaluator<'_>, args: &[Expr]) -> EvalResult<Value> {
    let n = ev.strict_number(&args[0])?;
    let format = ev.text(&args[1])?;
    if format.contains('$') {
        Ok(Value::Text(currency_string(n)))
    } else {
        Ok(Value::Text(format_number(n)))
    }
}

fn non_negative_int(function: &'static str, n: f64) -> EvalResult<usize> {
    if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return Err(EvalError::invalid_arg(
            function,
            format!("expected a whole number >= 0, got {}", format_number(n)),
        ));
    }
    Ok(n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_is_reachable_by_name() {
        for builtin in BUILTINS {
            assert!(std::ptr::eq(lookup(builtin.sheet_name).unwrap(), builtin));
            assert_eq!(builtin.sheet_name, builtin.sheet_name.to_ascii_uppercase());
        }
        assert!(lookup("sum").is_none());
        assert!(lookup("VLOOKUP").is_none());
    }

    #[test]
    fn test_criteria_matching() {
        let gt = Criteria::parse(">10".to_string());
        assert!(gt.matches("15"));
        assert!(!gt.matches("10"));
        assert!(!gt.matches("abc"));
        assert!(!gt.matches(""));

        let bad_threshold = Criteria::parse(">ten".to_string());
        assert!(!bad_threshold.matches("15"));

        let eq = Criteria::parse("Sales".to_string());
        assert!(eq.matches("Sales"));
        assert!(!eq.matches("sales"));
    }

    #[test]
    fn test_non_negative_int() {
        assert_eq!(non_negative_int("LEFT", 5.0), Ok(5));
        assert!(non_negative_int("LEFT", -1.0).is_err());
        assert!(non_negative_int("LEFT", 1.5).is_err());
    }
}
