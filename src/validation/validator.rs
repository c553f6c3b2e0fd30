//! # Rule Checks
//!
//! Stateless checks used by the filter compiler and by key requests.
//! Every check is pure and reports its own error kind.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{ValidationError, ValidationResult};
use super::sanitizer::SET_DELIMITER;

/// Anything that can answer whether a named field carries a value
pub trait ParamSource {
    /// True when the field exists and is not blank
    fn is_present(&self, name: &str) -> bool;
}

impl<S: BuildHasher> ParamSource for HashMap<String, String, S> {
    fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }
}

impl<S: BuildHasher> ParamSource for HashMap<String, Vec<String>, S> {
    fn is_present(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|values| values.iter().any(|v| !v.trim().is_empty()))
    }
}

/// Fail with every required name that is missing or blank
///
/// Names are reported in the order given, all of them at once.
pub fn require_all_present<P: ParamSource + ?Sized>(
    params: &P,
    required: &[&str],
) -> ValidationResult<()> {
    let names: Vec<String> = required
        .iter()
        .filter(|name| !params.is_present(name))
        .map(|name| name.to_string())
        .collect();

    if names.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingRequired { names })
    }
}

/// Every bar-separated token must be one of `allowed`
pub fn enum_membership(bar_value: &str, allowed: &[&str]) -> ValidationResult<()> {
    for token in bar_value.split(SET_DELIMITER) {
        if !allowed.contains(&token) {
            return Err(ValidationError::InvalidEnum {
                value: token.to_string(),
            });
        }
    }
    Ok(())
}

/// The value must be exactly `required_len` characters
pub fn fixed_length(value: &str, required_len: usize) -> ValidationResult<()> {
    if value.chars().count() != required_len {
        return Err(ValidationError::WrongLength {
            value: value.to_string(),
            required_len,
        });
    }
    Ok(())
}

/// Every bar-separated token must be exactly `required_len` characters
pub fn fixed_length_each(bar_value: &str, required_len: usize) -> ValidationResult<()> {
    for token in bar_value.split(SET_DELIMITER) {
        fixed_length(token, required_len)?;
    }
    Ok(())
}

/// Parse an integer within `[min, max]` that is not one of `exceptions`
///
/// Exceptions are retired or reserved values inside the range.
pub fn integer_in_range(
    value: &str,
    min: i64,
    max: i64,
    exceptions: &[i64],
) -> ValidationResult<i64> {
    let out_of_range = || ValidationError::OutOfRange {
        value: value.to_string(),
        min,
        max,
    };

    let parsed: i64 = value.parse().map_err(|_| out_of_range())?;
    if parsed < min || parsed > max || exceptions.contains(&parsed) {
        return Err(out_of_range());
    }
    Ok(parsed)
}

/// Parse a decimal within `[min, max]`
pub fn decimal_in_range(value: &str, min: i64, max: i64) -> ValidationResult<f64> {
    let out_of_range = || ValidationError::OutOfRange {
        value: value.to_string(),
        min,
        max,
    };

    let parsed: f64 = value.parse().map_err(|_| out_of_range())?;
    if !parsed.is_finite() || parsed < min as f64 || parsed > max as f64 {
        return Err(out_of_range());
    }
    Ok(parsed)
}

/// Match a flag against its two accepted literals, ignoring case
///
/// Returns `true` for the first literal of the pair, `false` for the second.
pub fn boolean_token(value: &str, accepted: (&str, &str)) -> ValidationResult<bool> {
    if value.eq_ignore_ascii_case(accepted.0) {
        Ok(true)
    } else if value.eq_ignore_ascii_case(accepted.1) {
        Ok(false)
    } else {
        Err(ValidationError::InvalidBoolean {
            value: value.to_string(),
        })
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// The value must look like an email address
pub fn email_address(value: &str) -> ValidationResult<()> {
    if email_pattern().is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail {
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_all_present_collects_every_name() {
        let mut params = HashMap::new();
        params.insert("name".to_string(), String::new());
        params.insert("email".to_string(), "  ".to_string());

        let err = require_all_present(&params, &["name", "email", "usage"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                names: vec!["name".into(), "email".into(), "usage".into()]
            }
        );
    }

    #[test]
    fn test_require_all_present_with_lists() {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        params.insert("name".to_string(), vec!["Jo".to_string()]);
        params.insert("usage".to_string(), vec![]);

        let err = require_all_present(&params, &["name", "usage"]).unwrap_err();
        assert_eq!(err.missing_names(), ["usage".to_string()]);
    }

    #[test]
    fn test_require_all_present_passes() {
        let mut params = HashMap::new();
        params.insert("month".to_string(), "3".to_string());
        assert!(require_all_present(&params, &["month"]).is_ok());
    }

    #[test]
    fn test_enum_membership() {
        assert!(enum_membership("AFR|ASI", &["AFR", "ASI", "EUR"]).is_ok());
        assert_eq!(
            enum_membership("AFR|XYZ|QQQ", &["AFR"]),
            Err(ValidationError::InvalidEnum { value: "XYZ".into() })
        );
    }

    #[test]
    fn test_fixed_length() {
        assert!(fixed_length("IN", 2).is_ok());
        assert!(fixed_length_each("IN|PK|BG", 2).is_ok());
        assert_eq!(
            fixed_length_each("IN|PAK", 2),
            Err(ValidationError::WrongLength { value: "PAK".into(), required_len: 2 })
        );
    }

    #[test]
    fn test_integer_in_range() {
        assert_eq!(integer_in_range("5", 1, 9, &[3]), Ok(5));
        assert!(integer_in_range("0", 1, 9, &[]).is_err());
        assert!(integer_in_range("10", 1, 9, &[]).is_err());
        assert!(integer_in_range("abc", 1, 9, &[]).is_err());
        assert_eq!(
            integer_in_range("3", 1, 9, &[3]),
            Err(ValidationError::OutOfRange { value: "3".into(), min: 1, max: 9 })
        );
    }

    #[test]
    fn test_decimal_in_range() {
        assert_eq!(decimal_in_range("2.5", 0, 100), Ok(2.5));
        assert!(decimal_in_range("100.1", 0, 100).is_err());
        assert!(decimal_in_range("1.2.3", 0, 100).is_err());
    }

    #[test]
    fn test_boolean_token() {
        assert_eq!(boolean_token("y", ("Y", "N")), Ok(true));
        assert_eq!(boolean_token("N", ("Y", "N")), Ok(false));
        assert_eq!(
            boolean_token("yes", ("Y", "N")),
            Err(ValidationError::InvalidBoolean { value: "yes".into() })
        );
    }

    #[test]
    fn test_email_address() {
        assert!(email_address("someone@example.org").is_ok());
        assert!(email_address("first.last+tag@mail.example.co.uk").is_ok());
        assert!(email_address("not-an-email").is_err());
        assert!(email_address("a@b").is_err());
    }
}
