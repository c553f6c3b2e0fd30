//! # Parameter Sanitizer
//!
//! Strips every character outside the allow list from raw parameter values.
//!
//! Allowed: ASCII letters and digits, the set delimiter `|`, the range
//! separator `-` and the decimal point `.`.

/// Set delimiter inside a parameter value
pub const SET_DELIMITER: char = '|';

/// Separator between range bounds
pub const RANGE_SEPARATOR: char = '-';

/// Returns whether a character survives sanitizing
#[inline]
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == SET_DELIMITER || c == RANGE_SEPARATOR || c == '.'
}

/// Remove disallowed characters, keeping the rest in order
pub fn clean(raw: &str) -> String {
    raw.chars().filter(|c| is_allowed(*c)).collect()
}

/// Clean every element of an array-valued parameter
pub fn clean_all(raw: &[String]) -> Vec<String> {
    raw.iter().map(|value| clean(value)).collect()
}
