//! Localized numeric value normalization
//!
//! Source amounts arrive as Colombian-formatted currency strings: period
//! as thousands separator, comma as decimal separator, optional leading
//! `$` and stray whitespace. The transform order is fixed:
//!
//! 1. strip the currency symbol and whitespace
//! 2. remove all periods (thousands separators)
//! 3. replace the comma with a period (decimal point)
//! 4. parse as f64
//!
//! HAZARD: this transform is wrong for plain period-decimal strings
//! ("1234.56" becomes 123456). It must only be applied to
//! Colombian-formatted sources; that is the caller's responsibility and
//! is not validated here.

/// Parse one localized currency/decimal-comma string.
///
/// `None` on anything that does not parse after the transform; callers
/// coerce to zero and count the failure.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.replace('.', "").replace(',', ".");
    cleaned.parse::<f64>().ok()
}

/// True when the cell is blank (empty after trimming). Blank cells coerce
/// to zero without being counted as parse failures; only populated cells
/// that fail the transform are anomalies.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colombian_currency_parses() {
        assert_eq!(parse_currency("$ 1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_currency("$1.000.000,00"), Some(1000000.0));
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(parse_currency("-$400.000,00"), Some(-400000.0));
        assert_eq!(parse_currency("$ -400.000,00"), Some(-400000.0));
    }

    #[test]
    fn plain_integers_and_decimal_comma_parse() {
        assert_eq!(parse_currency("160"), Some(160.0));
        assert_eq!(parse_currency("37,5"), Some(37.5));
    }

    #[test]
    fn garbage_and_empty_fail_to_parse() {
        assert_eq!(parse_currency("abc"), None);
        assert_eq!(parse_currency(""), None);
        assert_eq!(parse_currency("$"), None);
    }

    #[test]
    fn period_decimal_input_is_misread_as_documented() {
        // The documented hazard: periods are always thousands separators.
        assert_eq!(parse_currency("1234.56"), Some(123456.0));
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank("  "));
        assert!(is_blank(""));
        assert!(!is_blank("0"));
    }
}
