//! Declare / read / cast helpers over a [`VarStore`].
//!
//! Names may be given bare (`"player.hp"`) or as references (`"$player.hp"`);
//! both resolve to the same canonical key.  Every function auto-vivifies.
//!
//! Casting never fails.  A value is parsed as a number from its longest
//! numeric prefix (after leading whitespace); when there is none, the
//! truthiness rule applies: `""`, `"0"` and `"false"` are false/0 and
//! everything else is true/1.

use crate::reference::{canonical_key, extract, DEFAULT_SEP};
use crate::var::VarStore;

/// Conversion from a stored string value.
pub trait FromVar: Sized {
    fn from_var(value: &str) -> Self;
}

fn key_of(name: &str) -> String {
    canonical_key(&extract(name, DEFAULT_SEP, Some('.')))
}

/// Handle to `name` for declaring or updating it.
pub fn declare<'a>(vars: &'a mut VarStore, name: &str) -> &'a mut String {
    vars.locate(&key_of(name))
}

/// Current value of `name`.
pub fn read(vars: &mut VarStore, name: &str) -> String {
    declare(vars, name).clone()
}

/// Current value of `name` cast to `T`.
pub fn read_as<T: FromVar>(vars: &mut VarStore, name: &str) -> T {
    T::from_var(declare(vars, name))
}

/// Truthiness of a value that does not parse as a number.
pub fn truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && value != "false"
}

// ── Numeric prefixes ──────────────────────────────────────────────────────────

fn skip_digits(b: &[u8], mut i: usize) -> usize {
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    i
}

/// `[+-]?digits` at the start of `s` (after whitespace).
fn int_prefix(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let start = usize::from(matches!(b.first(), Some(b'+' | b'-')));
    let end = skip_digits(b, start);
    (end > start).then(|| &s[..end])
}

/// `[+-]?(digits[.digits]|.digits)([eE][+-]?digits)?` at the start of `s`
/// (after whitespace).
fn float_prefix(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let start = usize::from(matches!(b.first(), Some(b'+' | b'-')));
    let mut end = skip_digits(b, start);
    let mut digits = end - start;
    if b.get(end) == Some(&b'.') {
        let frac_end = skip_digits(b, end + 1);
        digits += frac_end - end - 1;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(b.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = skip_digits(b, exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    Some(&s[..end])
}

macro_rules! int_from_var {
    ($($t:ty),*) => {$(
        impl FromVar for $t {
            fn from_var(value: &str) -> Self {
                int_prefix(value)
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(if truthy(value) { 1 } else { 0 })
            }
        }
    )*};
}

int_from_var!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_from_var {
    ($($t:ty),*) => {$(
        impl FromVar for $t {
            fn from_var(value: &str) -> Self {
                float_prefix(value)
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(if truthy(value) { 1.0 } else { 0.0 })
            }
        }
    )*};
}

float_from_var!(f32, f64);

impl FromVar for bool {
    /// A leading integer `0` or `1` is read as a number; anything else
    /// falls back to truthiness.
    fn from_var(value: &str) -> Self {
        match int_prefix(value).and_then(|p| p.parse::<i64>().ok()) {
            Some(0) => false,
            Some(1) => true,
            _ => truthy(value),
        }
    }
}

impl FromVar for char {
    /// A one-character value is that character; otherwise the integer cast
    /// names a code point (NUL when it is not a valid one).
    fn from_var(value: &str) -> Self {
        let mut chars = value.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return c;
        }
        u32::try_from(i64::from_var(value))
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\0')
    }
}

impl FromVar for String {
    fn from_var(value: &str) -> Self {
        value.to_owned()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_then_read() {
        let mut vars = VarStore::new();
        *declare(&mut vars, "$hp") = "42".into();
        assert_eq!(read(&mut vars, "hp"), "42");
        assert_eq!(read_as::<i32>(&mut vars, "$hp"), 42);
    }

    #[test]
    fn compound_names_are_canonical() {
        let mut vars = VarStore::new();
        declare(&mut vars, "$player.name").push_str("Bob");
        assert_eq!(vars.get("player.name"), Some("Bob"));
        assert_eq!(read(&mut vars, "player.name"), "Bob");
    }

    #[test]
    fn read_vivifies() {
        let mut vars = VarStore::new();
        assert_eq!(read(&mut vars, "missing"), "");
        assert!(vars.contains("missing"));
        assert_eq!(read_as::<i64>(&mut vars, "other"), 0);
        assert!(vars.contains("other"));
    }

    #[test]
    fn integers_parse_prefix() {
        assert_eq!(i32::from_var("12"), 12);
        assert_eq!(i32::from_var("  -7 apples"), -7);
        assert_eq!(i32::from_var("3.9"), 3);
        assert_eq!(u8::from_var("+200"), 200);
    }

    #[test]
    fn integers_fall_back_to_truthiness() {
        assert_eq!(i32::from_var(""), 0);
        assert_eq!(i32::from_var("false"), 0);
        assert_eq!(i32::from_var("true"), 1);
        assert_eq!(i32::from_var("yes"), 1);
        assert_eq!(u32::from_var("-1"), 1);
        assert_eq!(u8::from_var("300"), 1);
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn floats() {
        assert_eq!(f64::from_var("3.14"), 3.14);
        assert_eq!(f64::from_var(".5x"), 0.5);
        assert_eq!(f64::from_var("1e3"), 1000.0);
        assert_eq!(f64::from_var("2e"), 2.0);
        assert_eq!(f32::from_var("hello"), 1.0);
        assert_eq!(f64::from_var(""), 0.0);
    }

    #[test]
    fn booleans() {
        assert!(bool::from_var("1"));
        assert!(!bool::from_var("0"));
        assert!(!bool::from_var(""));
        assert!(!bool::from_var("false"));
        assert!(bool::from_var("true"));
        assert!(bool::from_var("2"));
        assert!(bool::from_var("anything"));
    }

    #[test]
    fn chars() {
        assert_eq!(char::from_var("x"), 'x');
        assert_eq!(char::from_var("€"), '€');
        assert_eq!(char::from_var("65"), 'A');
        assert_eq!(char::from_var(""), '\0');
        assert_eq!(char::from_var("word"), '\u{1}');
        assert_eq!(char::from_var("-5"), '\0');
    }

    #[test]
    fn strings_are_identity() {
        assert_eq!(String::from_var(" as is "), " as is ");
    }
}
