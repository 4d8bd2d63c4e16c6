/// Format a token count with thousands separators.
///
/// # Examples
///
/// ```
/// use scan_core::formatting::format_tokens;
///
/// assert_eq!(format_tokens(0), "0");
/// assert_eq!(format_tokens(999), "999");
/// assert_eq!(format_tokens(184_523), "184,523");
/// assert_eq!(format_tokens(1_234_567), "1,234,567");
/// ```
pub fn format_tokens(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a signed integer with thousands separators.
///
/// # Examples
///
/// ```
/// use scan_core::formatting::format_signed;
///
/// assert_eq!(format_signed(-12_500), "-12,500");
/// assert_eq!(format_signed(42), "42");
/// ```
pub fn format_signed(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Round to the nearest integer, with exact halves going to the even
/// neighbour (`98.5` → `98`, `99.5` → `100`, `-12.5` → `-12`).
///
/// # Examples
///
/// ```
/// use scan_core::formatting::round_half_even;
///
/// assert_eq!(round_half_even(99.95), 100);
/// assert_eq!(round_half_even(2.5), 2);
/// assert_eq!(round_half_even(3.5), 4);
/// assert_eq!(round_half_even(-2.5), -2);
/// ```
pub fn round_half_even(value: f64) -> i64 {
    if (value - value.trunc()).abs() == 0.5 {
        (2.0 * (value / 2.0).round()) as i64
    } else {
        value.round() as i64
    }
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
