//! Destination rule compilation.

use regex::Regex;

/// A compiled pattern paired with the id of the route that declared it.
#[derive(Debug, Clone)]
pub struct DestinationRule {
    pub id: i64,
    pub pattern: Regex,
}

/// Split a comma-joined match string into pattern strings.
///
/// Segments are trimmed and empty segments dropped, so `"a.com, b.com,"`
/// yields two patterns. An empty pattern would match every destination.
pub fn split_joined(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compile `patterns` in order into rules carrying `id`.
///
/// Stops at the first pattern that fails to compile and returns it with the
/// regex error.
pub fn compile<'a, I>(id: i64, patterns: I) -> Result<Vec<DestinationRule>, (String, regex::Error)>
where
    I: IntoIterator<Item = &'a str>,
{
    patterns
        .into_iter()
        .map(|p| match Regex::new(p) {
            Ok(pattern) => Ok(DestinationRule { id, pattern }),
            Err(e) => Err((p.to_string(), e)),
        })
        .collect()
}
