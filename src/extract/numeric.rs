//! Conversion of human-readable magnitudes into counts
//!
//! Counters on the page are rendered as `"857"`, `"1.2K"` or `"3M"`. A bare
//! suffix (`"K"`) means one unit of that magnitude. Anything that still fails
//! to parse becomes `0.0`; counters are metadata, so losing one is preferable
//! to losing the document.

/// Values that can be read as a count
pub trait ToCount {
    /// Returns the value as a non-negative count
    fn to_count(&self) -> f64;
}

impl ToCount for str {
    fn to_count(&self) -> f64 {
        parse_magnitude(self)
    }
}

impl ToCount for String {
    fn to_count(&self) -> f64 {
        parse_magnitude(self)
    }
}

impl ToCount for f64 {
    fn to_count(&self) -> f64 {
        *self
    }
}

impl ToCount for f32 {
    fn to_count(&self) -> f64 {
        f64::from(*self)
    }
}

impl ToCount for i32 {
    fn to_count(&self) -> f64 {
        f64::from(*self)
    }
}

impl ToCount for i64 {
    fn to_count(&self) -> f64 {
        *self as f64
    }
}

impl ToCount for u32 {
    fn to_count(&self) -> f64 {
        f64::from(*self)
    }
}

impl ToCount for u64 {
    fn to_count(&self) -> f64 {
        *self as f64
    }
}

/// Converts a number or magnitude string into a count
///
/// # Example
///
/// ```
/// use quire::extract::to_number;
///
/// assert_eq!(to_number("1.2K"), 1200.0);
/// assert_eq!(to_number("M"), 1_000_000.0);
/// assert_eq!(to_number(&7_i64), 7.0);
/// ```
pub fn to_number<T: ToCount + ?Sized>(value: &T) -> f64 {
    value.to_count()
}

fn parse_magnitude(raw: &str) -> f64 {
    let cleaned = raw.trim().to_uppercase();

    if let Some(digits) = cleaned.strip_suffix('K') {
        return scaled(digits, 1_000.0);
    }
    if let Some(digits) = cleaned.strip_suffix('M') {
        return scaled(digits, 1_000_000.0);
    }

    cleaned.parse::<f64>().unwrap_or(0.0)
}

fn scaled(digits: &str, unit: f64) -> f64 {
    let digits = digits.trim_end();
    if digits.is_empty() {
        return unit;
    }
    digits.parse::<f64>().map(|n| n * unit).unwrap_or(0.0)
}
