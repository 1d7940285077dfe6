//! Exact conversion of provider decimal amounts into minor currency units.

/// Converts a decimal amount in major units (as rendered by the provider) into minor units.
///
/// Parsing is done on the textual representation so no floating point rounding is ever
/// applied. At most two significant fractional digits are accepted; trailing zeros beyond
/// that are tolerated. Exponent notation, empty components and overflow are rejected.
///
/// # Returns
/// - `Some(i64)` - Amount in minor units (cents)
/// - `None` - The value cannot be represented exactly in minor units
pub fn to_minor_units(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > 2 && !fraction[2..].bytes().all(|b| b == b'0') {
        return None;
    }

    let mut cents = fraction.chars().take(2).collect::<String>();
    while cents.len() < 2 {
        cents.push('0');
    }

    let whole: i64 = whole.parse().ok()?;
    let cents: i64 = cents.parse().ok()?;
    let value = whole.checked_mul(100)?.checked_add(cents)?;

    Some(if negative { -value } else { value })
}
