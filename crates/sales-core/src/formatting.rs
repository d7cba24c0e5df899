/// Format a unit count with thousands separators.
///
/// ```
/// use sales_core::formatting::format_units;
///
/// assert_eq!(format_units(12_480), "12,480");
/// assert_eq!(format_units(7), "7");
/// ```
pub fn format_units(units: u64) -> String {
    group_thousands(&units.to_string())
}

/// Round `value` to `places` decimal places. Exact halves go to the even
/// neighbour, so `90.625` rounds to `90.62`.
///
/// ```
/// use sales_core::formatting::round_to;
///
/// assert_eq!(round_to(90.625, 2), 90.62);
/// assert_eq!(round_to(2.5, 0), 2.0);
/// ```
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round_ties_even() / factor
}

/// Render an already-rounded growth percentage the way the report prints it:
/// whole numbers keep one trailing decimal (`50.0`), others print as-is
/// (`12.35`).
///
/// ```
/// use sales_core::formatting::format_growth;
///
/// assert_eq!(format_growth(50.0), "50.0");
/// assert_eq!(format_growth(-100.0), "-100.0");
/// assert_eq!(format_growth(12.35), "12.35");
/// ```
pub fn format_growth(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// ```
/// use sales_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round_to((part / whole) * 100.0, decimal_places)
}

/// Keep only ASCII letters and whitespace, e.g. `"2024_March"` → `"March"`.
pub fn letters_only(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_units ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(0), "0");
        assert_eq!(format_units(999), "999");
        assert_eq!(format_units(1_000), "1,000");
        assert_eq!(format_units(1_234_567), "1,234,567");
    }

    // ── round_to ─────────────────────────────────────────────────────────────

    #[test]
    fn test_round_to_two_places() {
        assert!((round_to(33.333_333, 2) - 33.33).abs() < 1e-9);
        assert!((round_to(-66.666_666, 2) + 66.67).abs() < 1e-9);
        assert_eq!(round_to(50.0, 2), 50.0);
    }

    #[test]
    fn test_round_to_halves_go_to_even() {
        assert_eq!(round_to(90.625, 2), 90.62);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(-12.5, 0), -12.0);
    }

    // ── format_growth ────────────────────────────────────────────────────────

    #[test]
    fn test_format_growth_whole_number() {
        assert_eq!(format_growth(50.0), "50.0");
        assert_eq!(format_growth(0.0), "0.0");
    }

    #[test]
    fn test_format_growth_fractional() {
        assert_eq!(format_growth(33.33), "33.33");
        assert_eq!(format_growth(-12.5), "-12.5");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(50.0, 200.0, 1);
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_percentage_rounding() {
        let p = percentage(1.0, 3.0, 2);
        assert!((p - 33.33).abs() < 1e-9, "percentage = {p}");
    }

    // ── letters_only ─────────────────────────────────────────────────────────

    #[test]
    fn test_letters_only_strips_year_and_separator() {
        assert_eq!(letters_only("2024_March"), "March");
        assert_eq!(letters_only("Grand Total"), "Grand Total");
    }
}
