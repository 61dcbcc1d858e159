//! Error types for formula evaluation.
//!
//! Every variant collapses to the `#ERROR` sentinel at the
//! [`evaluate_formula`](crate::engine::evaluate_formula) boundary; the detail
//! is kept for logging and for callers of `try_evaluate_formula`.

use thiserror::Error;

/// The sentinel shown in a cell whose formula failed to evaluate.
pub const ERROR_SENTINEL: &str = "#ERROR";

/// Errors that can occur while lexing, parsing, or evaluating a formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Formula must start with '='")]
    MissingEquals,

    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unterminated string literal")]
    UnterminatedString,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("Invalid argument for {function}: {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },

    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    #[error("Range {0} spans too many cells")]
    RangeTooLarge(String),

    #[error("Value is not a number: {0}")]
    NotANumber(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NonFinite,
}

impl EvalError {
    pub(crate) fn invalid_arg(function: &'static str, message: impl Into<String>) -> EvalError {
        EvalError::InvalidArgument {
            function,
            message: message.into(),
        }
    }
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;
