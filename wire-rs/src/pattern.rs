//! Glob pattern matching.
//!
//! Glob syntax:
//!   *   any sequence of characters, including the empty one
//!   ?   exactly one character that is not a record or line separator
//!   All other characters match themselves.
//!
//! [`glob_match`] is case-sensitive; [`glob_match_ci`] upper-cases both
//! operands before matching.

/// Returns `true` if `c` may not be consumed by `?`.
///
/// `.` separates the records of canonical variable keys and INI keys.
fn is_separator(c: char) -> bool {
    matches!(c, '.' | '\n' | '\r')
}

/// Returns `true` if `text` matches the glob `pattern`.
///
/// An empty pattern matches only the empty text.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    smatch(&p, &t)
}

/// Case-insensitive [`glob_match`].
pub fn glob_match_ci(pattern: &str, text: &str) -> bool {
    glob_match(&pattern.to_uppercase(), &text.to_uppercase())
}

/// Iterative match with a single backtrack point.
///
/// Only the most recent `*` needs remembering: a later star can absorb
/// anything an earlier one could, so the work is O(|pat| * |s|).
fn smatch(pat: &[char], s: &[char]) -> bool {
    let (mut pi, mut si) = (0, 0);
    // Pattern index just past the last `*`, and the text index it resumes at.
    let mut star: Option<(usize, usize)> = None;

    while si < s.len() {
        match pat.get(pi) {
            Some('*') => {
                while pat.get(pi) == Some(&'*') {
                    pi += 1;
                }
                star = Some((pi, si));
            }
            Some('?') if !is_separator(s[si]) => {
                pi += 1;
                si += 1;
            }
            Some(&c) if c != '?' && c == s[si] => {
                pi += 1;
                si += 1;
            }
            _ => match star {
                // Let the last `*` swallow one more character.
                Some((sp, ss)) => {
                    pi = sp;
                    si = ss + 1;
                    star = Some((sp, ss + 1));
                }
                None => return false,
            },
        }
    }
    pat[pi..].iter().all(|&c| c == '*')
}

// ── Tests ─────────────────────────────────────────────────────────────────────
