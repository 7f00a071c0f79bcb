use std::borrow::Cow;

/// Whether `text` may be emitted as a bare numeric literal.
///
/// Accepts an optional sign followed by digits with at most one `.`. Rejects exponents,
/// thousands separators, whitespace, and a leading zero (so account numbers like `0123`
/// keep their digits), with `"0"` itself as the only zero-led value allowed.
#[must_use]
pub fn is_plain_number(text: &str) -> bool {
    if text == "0" {
        return true;
    }

    let unsigned = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    if unsigned.starts_with('0') {
        return false;
    }

    let mut digits = 0usize;
    let mut dots = 0usize;
    for b in unsigned.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Rewrite a locale-formatted decimal (`3,5`) to use `.` when the host locale's decimal
/// separator is `,`.
///
/// Only a single `,` with no `.` present is treated as a decimal separator; anything else is
/// returned untouched and will fail `is_plain_number`.
#[must_use]
pub fn normalize_decimal(text: &str, decimal_separator: char) -> Cow<'_, str> {
    if decimal_separator == '.' || decimal_separator == '\0' {
        return Cow::Borrowed(text);
    }
    let separators = text.matches(decimal_separator).count();
    if separators == 1 && !text.contains('.') {
        Cow::Owned(text.replacen(decimal_separator, ".", 1))
    } else {
        Cow::Borrowed(text)
    }
}

/// Render a float as a SQL literal, or `None` for NaN and infinities.
///
/// Rust's float formatting never consults the process locale, so the decimal point is
/// always `.` and no exponent is produced.
#[must_use]
pub fn format_float(value: f64) -> Option<String> {
    if value.is_finite() {
        Some(value.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_pass() {
        for ok in ["0", "7", "42", "-42", "+3", "3.25", "-7.125", ".5", "10."] {
            assert!(is_plain_number(ok), "{ok} should pass");
        }
    }

    #[test]
    fn lookalikes_are_rejected() {
        for bad in [
            "", "-", ".", "0123", "00", "0.5", "-012", "1e5", "1E5", "1,000", "12 ", " 12",
            "1.2.3", "0x1F", "12abc", "NaN",
        ] {
            assert!(!is_plain_number(bad), "{bad:?} should be quoted");
        }
    }

    #[test]
    fn comma_locale_normalizes_single_separator() {
        assert_eq!(normalize_decimal("3,5", ','), "3.5");
        assert_eq!(normalize_decimal("1,000,5", ','), "1,000,5");
        assert_eq!(normalize_decimal("1.000,5", ','), "1.000,5");
        assert_eq!(normalize_decimal("3,5", '.'), "3,5");
    }

    #[test]
    fn floats_use_dot_and_reject_non_finite() {
        assert_eq!(format_float(3.5).as_deref(), Some("3.5"));
        assert_eq!(format_float(-0.25).as_deref(), Some("-0.25"));
        assert_eq!(format_float(2.0).as_deref(), Some("2"));
        assert_eq!(format_float(f64::NAN), None);
        assert_eq!(format_float(f64::INFINITY), None);
    }
}
