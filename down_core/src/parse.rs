//! # Lenient Cell Parsing
//!
//! The sheet stores every cell as the text the user typed. Numeric meaning
//! is applied here, and only here: a cell that fails to parse counts as
//! zero, silently. These functions never error — structural problems (bad
//! base size, negative weights) are caught by input validation instead.

/// Parse free-form numeric text (weights, sewing areas).
///
/// Accepts anything `f64` accepts after trimming. Unparseable or non-finite
/// text counts as zero.
///
/// ```rust
/// use down_core::parse::number;
///
/// assert_eq!(number("12.5"), 12.5);
/// assert_eq!(number("  .5 "), 0.5);
/// assert_eq!(number("abc"), 0.0);
/// assert_eq!(number(""), 0.0);
/// ```
pub fn number(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Parse a panel quantity: decimal digits only.
///
/// Returns `None` for anything else (empty, signs, decimals, overflow).
/// A panel is valid when this returns `Some(q)` with `q >= 1`.
pub fn quantity(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok()
}

/// Quantity rule for the entry grid's TOTAL row: an integer 1..=9 counts as
/// itself, everything else counts as one, so area sums stay meaningful while
/// quantities are still blank.
pub fn quantity_or_one(text: &str) -> u32 {
    match quantity(text) {
        Some(q) if (1..=9).contains(&q) => q,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_accepts_float_syntax() {
        assert_eq!(number("0"), 0.0);
        assert_eq!(number("103.75"), 103.75);
        assert_eq!(number(" 9999 "), 9999.0);
        assert_eq!(number(".25"), 0.25);
        assert_eq!(number("1e2"), 100.0);
        assert_eq!(number("-3.5"), -3.5);
    }

    #[test]
    fn test_number_failures_count_as_zero() {
        assert_eq!(number(""), 0.0);
        assert_eq!(number("   "), 0.0);
        assert_eq!(number("abc"), 0.0);
        assert_eq!(number("12abc"), 0.0);
        assert_eq!(number("1,5"), 0.0);
    }

    #[test]
    fn test_number_rejects_non_finite() {
        assert_eq!(number("inf"), 0.0);
        assert_eq!(number("NaN"), 0.0);
    }

    #[test]
    fn test_quantity_digits_only() {
        assert_eq!(quantity("3"), Some(3));
        assert_eq!(quantity(" 7 "), Some(7));
        assert_eq!(quantity("0"), Some(0));
        assert_eq!(quantity("12"), Some(12));
    }

    #[test]
    fn test_quantity_rejects_non_digits() {
        assert_eq!(quantity(""), None);
        assert_eq!(quantity("-3"), None);
        assert_eq!(quantity("2.0"), None);
        assert_eq!(quantity("x"), None);
        assert_eq!(quantity("99999999999999999999"), None);
    }

    #[test]
    fn test_quantity_or_one_total_row_rule() {
        assert_eq!(quantity_or_one("3"), 3);
        assert_eq!(quantity_or_one("9"), 9);
        assert_eq!(quantity_or_one(""), 1);
        assert_eq!(quantity_or_one("0"), 1);
        assert_eq!(quantity_or_one("12"), 1);
        assert_eq!(quantity_or_one("abc"), 1);
    }
}
