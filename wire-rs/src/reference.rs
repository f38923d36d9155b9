//! `$`-reference decoding.
//!
//! A reference such as `$player.name` is split into its path segments
//! (`["player", "name"]`).  The segments joined with `.` form the canonical
//! key the variable store is indexed by.

/// Default primary separator.
pub const DEFAULT_SEP: char = '$';

/// Split a reference into its path segments.
///
/// `text` is expected to begin with `sep0`; the remainder is split on `sep0`
/// and, if given, on `sep1`.  Runs of separators never produce empty
/// segments.  Input that does not begin with `sep0`, or that contains no
/// segment at all, comes back as a single segment holding the whole input.
pub fn extract(text: &str, sep0: char, sep1: Option<char>) -> Vec<String> {
    let Some(body) = text.strip_prefix(sep0) else {
        return vec![text.to_owned()];
    };
    let segments: Vec<String> = body
        .split(|c: char| c == sep0 || Some(c) == sep1)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if segments.is_empty() {
        vec![text.to_owned()]
    } else {
        segments
    }
}

/// [`extract`] with `$` as the only separator.
pub fn extract_default(text: &str) -> Vec<String> {
    extract(text, DEFAULT_SEP, None)
}

/// Canonical store key for a segment path.
pub fn canonical_key<S: AsRef<str>>(segments: &[S]) -> String {
    let mut key = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            key.push('.');
        }
        key.push_str(seg.as_ref());
    }
    key
}
