//! Sanitizer Property Tests
//!
//! The sanitizer is the first thing every parameter value passes through.
//! Its output must hold only allow-listed characters, keep their order and
//! be stable under repeated cleaning.

use peoplegroups_api::validation::sanitizer::{clean, clean_all, is_allowed};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_output_is_allow_listed(raw in any::<String>()) {
        prop_assert!(clean(&raw).chars().all(is_allowed));
    }

    #[test]
    fn prop_idempotent(raw in any::<String>()) {
        let once = clean(&raw);
        prop_assert_eq!(clean(&once), once);
    }

    #[test]
    fn prop_keeps_allowed_characters_in_order(raw in any::<String>()) {
        let expected: String = raw.chars().filter(|c| is_allowed(*c)).collect();
        prop_assert_eq!(clean(&raw), expected);
    }

    #[test]
    fn prop_clean_all_matches_clean(values in proptest::collection::vec(any::<String>(), 0..8)) {
        let cleaned = clean_all(&values);
        prop_assert_eq!(cleaned.len(), values.len());
        for (raw, out) in values.iter().zip(&cleaned) {
            prop_assert_eq!(&clean(raw), out);
        }
    }
}

#[test]
fn test_quote_and_comment_characters_never_survive() {
    for raw in ["'", "\"", ";", "/*", "*/", "\\", "%", "_", " ", "\n", "="] {
        assert_eq!(clean(raw), "", "{raw:?} should be stripped");
    }
}
