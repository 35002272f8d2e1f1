//! Categorical-field normalization.
//!
//! Fields persisted in both raw and normalized form (action type, item type,
//! neighborhood) are stored accent-free and upper-cased so reports can group
//! on them regardless of how operators typed the value.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics and upper-case.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}
