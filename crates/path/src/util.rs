/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Split a dotted path into its segments.
///
/// No validation is performed: `"a..b"` yields an empty middle segment and
/// `""` yields a single empty segment.
pub fn segments(path: &str) -> impl DoubleEndedIterator<Item = &str> {
    path.split(SEPARATOR)
}

/// Parse a dotted path into owned segments.
pub fn parse_path(path: &str) -> Vec<String> {
    segments(path).map(str::to_owned).collect()
}

/// Format segments back into a dotted path.
pub fn format_path<S: AsRef<str>>(steps: &[S]) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(step.as_ref());
    }
    out
}

/// Join a prefix and a key into a dotted path.
pub fn join(prefix: &str, key: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + key.len() + 1);
    out.push_str(prefix);
    out.push(SEPARATOR);
    out.push_str(key);
    out
}

/// Strict ancestors of a path, innermost first.
///
/// `"x.y.z"` yields `"x.y"` then `"x"`; a single-segment path has none.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.rmatch_indices(SEPARATOR).map(move |(idx, _)| &path[..idx])
}

/// Check if `parent` path strictly contains the `child` path.
pub fn is_child(parent: &str, child: &str) -> bool {
    child.len() > parent.len()
        && child.starts_with(parent)
        && child[parent.len()..].starts_with(SEPARATOR)
}

/// Parse a segment as a sequence index.
///
/// Only canonical non-negative integers are accepted: `"0"`, `"12"`, but not
/// `"012"`, `"-1"` or `"1.5"`.
pub fn parse_index(step: &str) -> Option<usize> {
    if !is_valid_index(step) {
        return None;
    }
    step.parse().ok()
}

/// Check if a string represents a valid non-negative integer array index.
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    // First char can't be leading zero unless it's just "0"
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}
