//! Formula tokenizer.
//!
//! Splits the text after the leading `=` into tokens. Whitespace between
//! tokens is skipped; string literals keep their contents verbatim (a doubled
//! `""` inside a literal is an escaped quote). Identifiers and cell
//! references are case-insensitive and come out uppercased.

use super::cell_ref::CellRef;
use crate::error::{EvalError, EvalResult};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    /// Function name or boolean literal, uppercased.
    Ident(String),
    Cell(CellRef),
    Colon,
    Comma,
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Tokenize a formula body (without the leading `=`).
pub fn tokenize(input: &str) -> EvalResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let single = match c {
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '=' => Some(Token::Eq),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(token);
            pos += 1;
            continue;
        }

        match c {
            '<' => {
                let (token, width) = match chars.get(pos + 1) {
                    Some('=') => (Token::Le, 2),
                    Some('>') => (Token::Ne, 2),
                    _ => (Token::Lt, 1),
                };
                tokens.push(token);
                pos += width;
            }
            '>' => {
                let (token, width) = match chars.get(pos + 1) {
                    Some('=') => (Token::Ge, 2),
                    _ => (Token::Gt, 1),
                };
                tokens.push(token);
                pos += width;
            }
            '"' => {
                let (text, next) = scan_string(&chars, pos)?;
                tokens.push(Token::Str(text));
                pos = next;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (n, next) = scan_number(&chars, pos)?;
                tokens.push(Token::Number(n));
                pos = next;
            }
            c if c.is_ascii_alphabetic() || c == '$' => {
                let (token, next) = scan_word(&chars, pos)?;
                tokens.push(token);
                pos = next;
            }
            other => return Err(EvalError::UnexpectedChar { ch: other, pos }),
        }
    }

    Ok(tokens)
}

fn scan_string(chars: &[char], start: usize) -> EvalResult<(String, usize)> {
    let mut text = String::new();
    let mut pos = start + 1;
    loop {
        match chars.get(pos) {
            None => return Err(EvalError::UnterminatedString),
            Some('"') if chars.get(pos + 1) == Some(&'"') => {
                text.push('"');
                pos += 2;
            }
            Some('"') => return Ok((text, pos + 1)),
            Some(ch) => {
                text.push(*ch);
                pos += 1;
            }
        }
    }
}

fn scan_number(chars: &[char], start: usize) -> EvalResult<(f64, usize)> {
    let mut pos = start;
    let mut seen_dot = false;
    while let Some(&ch) = chars.get(pos) {
        if ch.is_ascii_digit() {
            pos += 1;
        } else if ch == '.' && !seen_dot {
            seen_dot = true;
            pos += 1;
        } else {
            break;
        }
    }

    // Exponent, same grammar as numeric cell values: `1e3`, `2.5E-2`.
    if matches!(chars.get(pos), Some('e' | 'E')) {
        let digits_at = match chars.get(pos + 1) {
            Some('+' | '-') => pos + 2,
            _ => pos + 1,
        };
        if chars.get(digits_at).is_some_and(|c| c.is_ascii_digit()) {
            pos = digits_at;
            while chars.get(pos).is_some_and(|c| c.is_ascii_digit()) {
                pos += 1;
            }
        }
    }

    let literal: String = chars[start..pos].iter().collect();
    literal
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| (n, pos))
        .ok_or_else(|| EvalError::Parse(format!("Invalid number '{}'", literal)))
}

/// Scan `$?LETTERS$?DIGITS` (a cell reference) or `LETTERS` (an identifier).
fn scan_word(chars: &[char], start: usize) -> EvalResult<(Token, usize)> {
    let mut pos = start;
    let mut has_dollar = false;

    if chars[pos] == '$' {
        has_dollar = true;
        pos += 1;
    }
    let letters_start = pos;
    while chars.get(pos).is_some_and(|c| c.is_ascii_alphabetic()) {
        pos += 1;
    }
    let letters_end = pos;

    if chars.get(pos) == Some(&'$') {
        has_dollar = true;
        pos += 1;
    }
    let digits_start = pos;
    while chars.get(pos).is_some_and(|c| c.is_ascii_digit()) {
        pos += 1;
    }

    let letters: String = chars[letters_start..letters_end].iter().collect();
    let word: String = chars[start..pos].iter().collect();

    if letters.is_empty() {
        return Err(EvalError::UnexpectedChar {
            ch: chars[start],
            pos: start,
        });
    }

    if digits_start == pos {
        // No row digits: only a plain identifier is acceptable.
        if has_dollar {
            return Err(EvalError::InvalidReference(word));
        }
        return Ok((Token::Ident(letters.to_ascii_uppercase()), pos));
    }

    // A reference glued to more letters ("A1B") is not a reference.
    if let Some(&next) = chars.get(pos)
        && (next.is_ascii_alphanumeric() || next == '$')
    {
        return Err(EvalError::UnexpectedChar { ch: next, pos });
    }

    let cell = CellRef::from_str(&word).ok_or_else(|| EvalError::InvalidReference(word.clone()))?;
    Ok((Token::Cell(cell), pos))
}
