//! Intermediate values produced while evaluating a formula.

use super::format::format_number;

/// Result of evaluating a (sub)expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An absent cell, or a cell holding the empty string.
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// Wrap a stored cell value. The empty string reads as an absent cell.
    pub fn from_cell(raw: Option<&str>) -> Value {
        match raw {
            Some(s) if !s.is_empty() => Value::Text(s.to_string()),
            _ => Value::Empty,
        }
    }

    /// Numeric reading of the value: empty is 0, text must parse as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Empty => Some(0.0),
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    /// Text reading of the value, used by string functions. Empty is `""`.
    pub fn as_text(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Bool(b) => bool_text(*b).to_string(),
        }
    }

    /// Truthiness for IF conditions. Text that is neither numeric nor a
    /// boolean literal is false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Empty => false,
            Value::Number(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::Text(s) => {
                if let Some(n) = parse_number(s) {
                    n != 0.0
                } else {
                    s.trim().eq_ignore_ascii_case("TRUE")
                }
            }
        }
    }

    /// Final display string of a formula result. An empty result reads as `0`,
    /// matching how a bare reference to an absent cell displays.
    pub fn render(&self) -> String {
        match self {
            Value::Empty => "0".to_string(),
            other => other.as_text(),
        }
    }
}

fn bool_text(b: bool) -> &'static str {
    if b { "TRUE" } else { "FALSE" }
}

/// Parse a stored cell string as a finite number. Surrounding whitespace is
/// ignored; anything else (including `inf`/`NaN` spellings) is non-numeric.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
