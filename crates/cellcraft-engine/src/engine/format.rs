//! Number rendering shared by the evaluator and the grid display.

/// Format a number for display.
///
/// Integral values print without a decimal point, everything else in the
/// shortest form that round-trips (`85.75`, `0.30000000000000004`).
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Also folds -0 into "0".
        return "0".to_string();
    }
    format!("{}", n)
}

/// Fixed number of decimal places (always prints trailing zeros).
pub fn fixed_decimal_string(n: f64, decimals: usize) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{:.*}", decimals, n)
}

/// Insert `,` between thousands groups of the integer part of a rendered number.
pub fn group_thousands(rendered: &str) -> String {
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(rendered.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// `$` followed by the value with two decimals and thousands separators.
pub fn currency_string(n: f64) -> String {
    format!("${}", group_thousands(&fixed_decimal_string(n, 2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(85.75), "85.75");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_fixed_decimal_string() {
        assert_eq!(fixed_decimal_string(1.23456, 2), "1.23");
        assert_eq!(fixed_decimal_string(2.4, 0), "2");
        assert_eq!(fixed_decimal_string(7.0, 3), "7.000");
        assert_eq!(fixed_decimal_string(-0.0, 1), "0.0");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1234.56"), "1,234.56");
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("999.00"), "999.00");
        assert_eq!(group_thousands("-1000.50"), "-1,000.50");
        assert_eq!(group_thousands("0"), "0");
    }

    #[test]
    fn test_currency_string() {
        assert_eq!(currency_string(1234.56), "$1,234.56");
        assert_eq!(currency_string(0.5), "$0.50");
        assert_eq!(currency_string(2450.75), "$2,450.75");
    }
}
