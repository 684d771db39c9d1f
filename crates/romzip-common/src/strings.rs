//! ASCII case-insensitive string matching.
//!
//! Archive entry names are compared against fixed prefixes and extensions
//! without allocating lowercase copies.

/// Check whether `s` starts with `prefix`, ignoring ASCII case.
#[inline]
pub fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Check whether `s` ends with `suffix`, ignoring ASCII case.
#[inline]
pub fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    s.len() >= suffix.len()
        && s.as_bytes()[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

/// Check whether `s` ends with any of `suffixes`, ignoring ASCII case.
pub fn ends_with_any_ignore_case(s: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| ends_with_ignore_case(s, suffix))
}
