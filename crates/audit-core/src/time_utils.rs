use std::sync::OnceLock;

use regex::Regex;

// ── Date keys ─────────────────────────────────────────────────────────────────

/// Year, month and day separated by `.`, `-`, `/` or the `年`/`月`/`日` markers.
/// Digits are ASCII only.
fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]{4})[./\-年]([0-9]{1,2})[./\-月]([0-9]{1,2})日?").expect("regex is valid")
    })
}

/// Extract a canonical `YYYY-MM-DD` key from a date-like string.
///
/// The first match anywhere in `s` wins; month and day are zero-padded.
/// No calendar validation is done, so `2024-02-31` is accepted as-is.
///
/// # Examples
///
/// ```
/// use audit_core::time_utils::extract_date_key;
///
/// assert_eq!(extract_date_key("2024/3/1 08:15:00").as_deref(), Some("2024-03-01"));
/// assert_eq!(extract_date_key("2024年3月15日").as_deref(), Some("2024-03-15"));
/// assert_eq!(extract_date_key("yesterday"), None);
/// ```
pub fn extract_date_key(s: &str) -> Option<String> {
    let caps = date_pattern().captures(s)?;
    Some(format!(
        "{}-{:0>2}-{:0>2}",
        &caps[1], &caps[2], &caps[3]
    ))
}

/// Short `M.D` column label for a `YYYY-MM-DD` key, without zero padding.
///
/// Keys that are not in canonical form are returned unchanged.
///
/// ```
/// use audit_core::time_utils::date_label;
///
/// assert_eq!(date_label("2024-03-01"), "3.1");
/// assert_eq!(date_label("2024-11-20"), "11.20");
/// ```
pub fn date_label(key: &str) -> String {
    let mut parts = key.splitn(3, '-');
    let (Some(_), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return key.to_string();
    };
    match (month.parse::<u32>(), day.parse::<u32>()) {
        (Ok(m), Ok(d)) => format!("{}.{}", m, d),
        _ => key.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
