use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Removes combining diacritical marks: "Café" becomes "Cafe".
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Case folding used for merchant matching. Uppercase, so "ß" folds to "SS".
pub(crate) fn fold_case(s: &str) -> String {
    s.to_uppercase()
}
