//! Path and tag matching shared by the resource kinds.
//!
//! A path ending in `*` is a prefix pattern; any other path matches only
//! itself.

use std::collections::BTreeSet;

/// Returns true if `pattern` covers `path`.
#[must_use]
pub fn covers(pattern: &str, path: &str) -> bool {
    pattern
        .strip_suffix('*')
        .map_or_else(|| pattern == path, |prefix| path.starts_with(prefix))
}

/// Returns true if either path covers the other.
#[must_use]
pub fn overlaps(first: &str, second: &str) -> bool {
    covers(first, second) || covers(second, first)
}

/// Returns every pair of overlapping paths between two sets.
#[must_use]
pub fn overlapping_paths<'a>(
    first: &'a BTreeSet<String>,
    second: &'a BTreeSet<String>,
) -> Vec<(&'a str, &'a str)> {
    first
        .iter()
        .flat_map(|a| second.iter().map(move |b| (a.as_str(), b.as_str())))
        .filter(|(a, b)| overlaps(a, b))
        .collect()
}

/// Returns the required paths that no provided path covers.
#[must_use]
pub fn uncovered_paths<'a>(
    required: &'a BTreeSet<String>,
    provided: &BTreeSet<String>,
) -> Vec<&'a str> {
    required
        .iter()
        .filter(|path| !provided.iter().any(|pattern| covers(pattern, path)))
        .map(String::as_str)
        .collect()
}

/// Returns the required tags missing from the provided set.
#[must_use]
pub fn missing_tags<'a>(
    required: &'a BTreeSet<String>,
    provided: &BTreeSet<String>,
) -> Vec<&'a str> {
    required
        .iter()
        .filter(|tag| !provided.contains(*tag))
        .map(String::as_str)
        .collect()
}
