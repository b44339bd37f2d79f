/// Format `numerator / denominator` as a percentage fixed to `decimals`
/// digits, without the `%` sign.
///
/// A zero denominator yields `0` padded to `decimals` zeros instead of
/// dividing.
///
/// # Examples
///
/// ```
/// use audit_core::formatting::format_percent;
///
/// assert_eq!(format_percent(1.0, 3.0, 2), "33.33");
/// assert_eq!(format_percent(2.0, 3.0, 4), "66.6667");
/// assert_eq!(format_percent(7.0, 0.0, 2), "0.00");
/// assert_eq!(format_percent(7.0, 0.0, 0), "0");
/// ```
pub fn format_percent(numerator: f64, denominator: f64, decimals: usize) -> String {
    if denominator == 0.0 {
        return format_fixed(0.0, decimals);
    }
    format_fixed(numerator / denominator * 100.0, decimals)
}

/// Format an already-computed value to `decimals` fixed digits.
///
/// ```
/// use audit_core::formatting::format_fixed;
///
/// assert_eq!(format_fixed(12.5, 2), "12.50");
/// assert_eq!(format_fixed(3.0, 0), "3");
/// ```
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Unrounded `(part / whole) * 100`, or `0.0` when `whole` is zero.
pub fn ratio_percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

// ── Tests ──────────────────────────────────────────────────────────────────────
