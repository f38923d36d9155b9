//! Extended owned string and string list.
//!
//! [`Text`] wraps a [`String`] and adds circular indexing, python-style
//! stripping, glob matching, tokenizing, counting and the replacement family
//! (including priority multi-pattern replacement through [`RuleSet`]).
//! [`Strings`] is a deque of [`Text`] with circular indexing and formatted
//! joining.
//!
//! Positional formatting uses control bytes as placeholders: `\x01` is the
//! first argument, `\x02` the second and so on.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::cast::FromVar;
use crate::pattern::{glob_match, glob_match_ci};
use crate::subst::RuleSet;

/// An owned string with convenience operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Text {
    pub data: String,
}

impl Text {
    /// Create a new, empty `Text`.
    pub const fn new() -> Self {
        Self {
            data: String::new(),
        }
    }

    /// Replace `\x01`..`\xNN` in `fmt` with the display form of `args`.
    ///
    /// Control characters beyond the number of arguments are copied through.
    pub fn format(fmt: &str, args: &[&dyn fmt::Display]) -> Self {
        let mut out = String::with_capacity(fmt.len());
        for ch in fmt.chars() {
            match (ch as usize).checked_sub(1).and_then(|i| args.get(i)) {
                Some(arg) => out.push_str(&arg.to_string()),
                None => out.push(ch),
            }
        }
        out.into()
    }

    /// Number of characters.
    pub fn char_count(&self) -> usize {
        self.data.chars().count()
    }

    // ── Circular access ───────────────────────────────────────────────────────

    /// Character at `pos`, wrapping around in both directions.
    ///
    /// `at(len)` is the first character and `at(-1)` the last.  Empty text
    /// yields NUL.
    pub fn at(&self, pos: isize) -> char {
        let n = self.char_count();
        if n == 0 {
            return '\0';
        }
        let idx = pos.rem_euclid(n as isize) as usize;
        self.data.chars().nth(idx).unwrap_or('\0')
    }

    pub fn front(&self) -> char {
        self.at(0)
    }

    pub fn back(&self) -> char {
        self.at(-1)
    }

    pub fn push_front(&mut self, t: impl fmt::Display) {
        self.data.insert_str(0, &t.to_string());
    }

    pub fn push_back(&mut self, t: impl fmt::Display) {
        self.data.push_str(&t.to_string());
    }

    /// Remove the first character, if any.
    pub fn pop_front(&mut self) -> Option<char> {
        let c = self.data.chars().next()?;
        self.data.drain(..c.len_utf8());
        Some(c)
    }

    /// Remove the last character, if any.
    pub fn pop_back(&mut self) -> Option<char> {
        self.data.pop()
    }

    // ── Case and matching ─────────────────────────────────────────────────────

    pub fn uppercase(&self) -> Text {
        self.data.to_uppercase().into()
    }

    pub fn lowercase(&self) -> Text {
        self.data.to_lowercase().into()
    }

    /// Glob match against `pattern` (`*`, `?`).
    pub fn matches(&self, pattern: &str) -> bool {
        glob_match(pattern, &self.data)
    }

    pub fn matches_ci(&self, pattern: &str) -> bool {
        glob_match_ci(pattern, &self.data)
    }

    pub fn starts_with_ci(&self, prefix: &str) -> bool {
        self.data.to_uppercase().starts_with(&prefix.to_uppercase())
    }

    pub fn ends_with_ci(&self, suffix: &str) -> bool {
        self.data.to_uppercase().ends_with(&suffix.to_uppercase())
    }

    /// Non-overlapping occurrences of `sub`.  An empty `sub` counts as 0.
    pub fn count(&self, sub: &str) -> usize {
        if sub.is_empty() {
            0
        } else {
            self.data.matches(sub).count()
        }
    }

    // ── Slicing ───────────────────────────────────────────────────────────────

    /// Text before the first `sub`, or the whole text.
    pub fn left_of(&self, sub: &str) -> Text {
        match self.data.find(sub) {
            Some(pos) => self.data[..pos].into(),
            None => self.clone(),
        }
    }

    /// Text after the first `sub`, or the whole text.
    pub fn right_of(&self, sub: &str) -> Text {
        match self.data.find(sub) {
            Some(pos) => self.data[pos + sub.len()..].into(),
            None => self.clone(),
        }
    }

    // ── Replacement ───────────────────────────────────────────────────────────

    /// Replace the first occurrence of `target`.
    pub fn replace1(&self, target: &str, replacement: &str) -> Text {
        self.data.replacen(target, replacement, 1).into()
    }

    /// Replace every occurrence of `target`.  Inserted text is not rescanned.
    pub fn replace(&self, target: &str, replacement: &str) -> Text {
        if target.is_empty() {
            return self.clone();
        }
        self.data.replace(target, replacement).into()
    }

    /// Priority multi-pattern replacement; see [`RuleSet::substitute`].
    pub fn replace_map(&self, rules: &RuleSet) -> Text {
        rules.substitute(&self.data).into()
    }

    // ── Stripping ─────────────────────────────────────────────────────────────

    fn strip_with(&self, chars: &str, left: bool, right: bool) -> Text {
        let strip = |c: char| {
            if chars.is_empty() {
                c.is_whitespace()
            } else {
                chars.contains(c)
            }
        };
        let mut s = self.data.as_str();
        if left {
            s = s.trim_start_matches(strip);
        }
        if right {
            s = s.trim_end_matches(strip);
        }
        s.into()
    }

    /// Strip leading and trailing `chars` (whitespace when empty).
    pub fn strip(&self, chars: &str) -> Text {
        self.strip_with(chars, true, true)
    }

    pub fn lstrip(&self, chars: &str) -> Text {
        self.strip_with(chars, true, false)
    }

    pub fn rstrip(&self, chars: &str) -> Text {
        self.strip_with(chars, false, true)
    }

    pub fn trim(&self, chars: &str) -> Text {
        self.strip(chars)
    }

    pub fn ltrim(&self, chars: &str) -> Text {
        self.lstrip(chars)
    }

    pub fn rtrim(&self, chars: &str) -> Text {
        self.rstrip(chars)
    }

    // ── Splitting ─────────────────────────────────────────────────────────────

    /// Split on any character of `delimiters`, dropping empty tokens.
    pub fn tokenize(&self, delimiters: &str) -> Strings {
        self.data
            .split(|c: char| delimiters.contains(c))
            .filter(|t| !t.is_empty())
            .map(Text::from)
            .collect()
    }

    /// Split on any character of `delimiters`, keeping each delimiter as a
    /// token of its own.
    pub fn split(&self, delimiters: &str) -> Strings {
        let mut tokens = Strings::new();
        let mut cur = String::new();
        for ch in self.data.chars() {
            if delimiters.contains(ch) {
                if !cur.is_empty() {
                    tokens.push_back(std::mem::take(&mut cur).into());
                }
                tokens.push_back(Text::from(ch));
            } else {
                cur.push(ch);
            }
        }
        if !cur.is_empty() {
            tokens.push_back(cur.into());
        }
        tokens
    }

    /// Cast the contents; see [`crate::cast`].
    pub fn as_value<T: FromVar>(&self) -> T {
        T::from_var(&self.data)
    }

    /// Compare after casting both sides to `T`, so `"1.0"` equals `1` as
    /// `f64` and `"yes"` equals `true` as `bool`.
    pub fn eq_as<T: FromVar + PartialEq>(&self, other: impl fmt::Display) -> bool {
        self.as_value::<T>() == T::from_var(&other.to_string())
    }
}

impl Deref for Text {
    type Target = str;
    fn deref(&self) -> &str {
        &self.data
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self { data: s.to_owned() }
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self { data: s }
    }
}

impl From<char> for Text {
    fn from(c: char) -> Self {
        Self {
            data: c.to_string(),
        }
    }
}

impl From<bool> for Text {
    fn from(b: bool) -> Self {
        Self::from(if b { "true" } else { "false" })
    }
}

macro_rules! text_from_display {
    ($($t:ty),*) => {$(
        impl From<$t> for Text {
            fn from(v: $t) -> Self {
                Self { data: v.to_string() }
            }
        }
    )*};
}

text_from_display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<Text> for String {
    fn from(t: Text) -> Self {
        t.data
    }
}

impl std::str::FromStr for Text {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.data == other
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.data == *other
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

// ── Strings ───────────────────────────────────────────────────────────────────

static EMPTY: Text = Text::new();

/// A deque of [`Text`] with circular indexing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Strings(VecDeque<Text>);

impl Strings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any sequence of string-likes, e.g. `std::env::args()`.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Text>,
    {
        args.into_iter().map(Into::into).collect()
    }

    /// Element at `pos`, wrapping around in both directions.  An empty list
    /// yields an empty text.
    pub fn at(&self, pos: isize) -> &Text {
        if self.0.is_empty() {
            return &EMPTY;
        }
        let idx = pos.rem_euclid(self.0.len() as isize) as usize;
        &self.0[idx]
    }

    /// Join the elements, each formatted through `format1` (`\x01` is the
    /// element), between `pre` and `post`.  A single element is emitted bare.
    pub fn join_format(&self, format1: &str, pre: &str, post: &str) -> String {
        if self.0.len() == 1 {
            return format!("{pre}{}{post}", self.0[0]);
        }
        let mut out = String::from(pre);
        for t in &self.0 {
            out.push_str(&Text::format(format1, &[t]));
        }
        out.push_str(post);
        out
    }
}

impl Deref for Strings {
    type Target = VecDeque<Text>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Strings {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Into<Text>> FromIterator<T> for Strings {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Strings {
    type Item = Text;
    type IntoIter = std::collections::vec_deque::IntoIter<Text>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Strings {
    type Item = &'a Text;
    type IntoIter = std::collections::vec_deque::Iter<'a, Text>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Strings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join_format("\x01\n", "", ""))
    }
}

// ── Container formatting ──────────────────────────────────────────────────────

/// Every item formatted through `format1` (`\x01` is the item), between
/// `pre` and `post`.
pub fn format_each<I>(items: I, format1: &str, pre: &str, post: &str) -> String
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    let mut out = String::from(pre);
    for item in items {
        out.push_str(&Text::format(format1, &[&item]));
    }
    out.push_str(post);
    out
}

/// The keys of `pairs` formatted through `format1`.
pub fn format_keys<I, K, V>(pairs: I, format1: &str, pre: &str, post: &str) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: fmt::Display,
{
    format_each(pairs.into_iter().map(|(k, _)| k), format1, pre, post)
}

/// The values of `pairs` formatted through `format1`.
pub fn format_values<I, K, V>(pairs: I, format1: &str, pre: &str, post: &str) -> String
where
    I: IntoIterator<Item = (K, V)>,
    V: fmt::Display,
{
    format_each(pairs.into_iter().map(|(_, v)| v), format1, pre, post)
}

/// Every pair formatted through `format12` (`\x01` is the key, `\x02` the
/// value), between `pre` and `post`.
pub fn format_pairs<I, K, V>(pairs: I, format12: &str, pre: &str, post: &str) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: fmt::Display,
    V: fmt::Display,
{
    let mut out = String::from(pre);
    for (k, v) in pairs {
        out.push_str(&Text::format(format12, &[&k, &v]));
    }
    out.push_str(post);
    out
}

// ── Hex-float conversion ──────────────────────────────────────────────────────

/// Exact textual form of `x` in C99 hex-float notation (`0x1.8p+1`).
///
/// Infinities are `INF` / `-INF` and NaN is `NaN`.
pub fn precise(x: f64) -> String {
    if x.is_nan() {
        return "NaN".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "INF" } else { "-INF" }.into();
    }
    let bits = x.to_bits();
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let mantissa = bits & ((1u64 << 52) - 1);
    let (lead, exp) = match (biased, mantissa) {
        (0, 0) => (0, 0),
        (0, _) => (0, -1022),
        _ => (1, biased - 1023),
    };
    let frac = format!("{mantissa:013x}");
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{sign}0x{lead}p{exp:+}")
    } else {
        format!("{sign}0x{lead}.{frac}p{exp:+}")
    }
}

/// Parse the output of [`precise`] (or any C99 hex-float literal).
pub fn parse_precise(s: &str) -> Option<f64> {
    let s = s.trim();
    match s {
        "INF" | "+INF" => return Some(f64::INFINITY),
        "-INF" => return Some(f64::NEG_INFINITY),
        "NaN" => return Some(f64::NAN),
        _ => {}
    }
    let (negative, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let rest = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))?;
    let (digits, exp) = match rest.find(['p', 'P']) {
        Some(i) => (&rest[..i], rest[i + 1..].parse::<i32>().ok()?),
        None => (rest, 0),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut mantissa: u64 = 0;
    let mut exp = exp;
    for (i, c) in int_part.chars().chain(frac_part.chars()).enumerate() {
        let d = c.to_digit(16)?;
        let is_frac = i >= int_part.len();
        if mantissa >> 60 == 0 {
            mantissa = (mantissa << 4) | u64::from(d);
            if is_frac {
                exp -= 4;
            }
        } else if !is_frac {
            // Digit dropped for precision; keep its weight.
            exp += 4;
        }
    }
    let value = ldexp(mantissa as f64, exp);
    Some(if negative { -value } else { value })
}

/// `m * 2^e`, scaled in steps so intermediate powers stay finite.
fn ldexp(mut m: f64, mut e: i32) -> f64 {
    while e > 1000 {
        m *= 2f64.powi(1000);
        e -= 1000;
    }
    while e < -1000 {
        m *= 2f64.powi(-1000);
        e += 1000;
    }
    m * 2f64.powi(e)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
