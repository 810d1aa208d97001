//! Locale-free numeric parsing shared by every chart kind.
//!
//! A failed parse means two different things depending on the caller:
//! aggregation treats it as `0` ([`number_or_zero`]) while filtering treats
//! the cell as absent ([`parse_number`] returning `None`). Both readings are
//! kept on purpose and must stay in sync with each other.

use crate::dataset::CellValue;

/// Parse a cell as a finite number.
pub fn parse_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) | CellValue::Missing => None,
        CellValue::String(s) => parse_decimal_prefix(s),
    }
}

/// Aggregation reading: anything unparseable counts as zero.
pub fn number_or_zero(cell: &CellValue) -> f64 {
    parse_number(cell).unwrap_or(0.0)
}

/// Whole-value reading used to decide whether a column is numeric: the
/// entire trimmed text must be a finite decimal, so `"5kg"` does not count.
pub fn is_numeric_value(cell: &CellValue) -> bool {
    match cell {
        CellValue::Number(n) => n.is_finite(),
        CellValue::String(s) => parse_decimal_exact(s).is_some(),
        CellValue::Missing => false,
    }
}

/// Parse the longest decimal prefix of `input`.
///
/// Leading whitespace is skipped and trailing text after a valid prefix is
/// ignored, so `" 12.5kg"` reads as `12.5`. No thousands separators, no
/// locale-specific decimal commas, no `inf`/`NaN`.
pub fn parse_decimal_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let end = decimal_prefix_end(s)?;
    finite(&s[..end])
}

/// Parse `input` only when, once trimmed, all of it is a decimal.
pub fn parse_decimal_exact(input: &str) -> Option<f64> {
    let s = input.trim();
    match decimal_prefix_end(s) {
        Some(end) if end == s.len() => finite(s),
        _ => None,
    }
}

fn finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

// Byte length of the decimal at the start of `s`, if there is one.
fn decimal_prefix_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(end)
}
