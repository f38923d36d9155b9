//! Recursive `$name` interpolation.
//!
//! | Sequence        | Meaning                                              |
//! |-----------------|------------------------------------------------------|
//! | `$name`         | value of variable `name`                             |
//! | `$a.b`          | value of the compound variable with canonical key `a.b` |
//! | `$` otherwise   | literal `$`                                          |
//!
//! Values are themselves expanded until they contain no further references.
//! Every key being expanded is recorded in a [`Guard`]; a reference to a key
//! that is already in flight is replaced by its stored value without further
//! expansion, so cyclic definitions always terminate.

use crate::reference::{canonical_key, extract, DEFAULT_SEP};
use crate::var::{VarSource, VarStore};

/// Default bound on nested expansions.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Set of canonical keys currently being expanded.
#[derive(Debug, Default, Clone)]
pub struct Guard {
    in_flight: Vec<String>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.in_flight.iter().any(|k| k == key)
    }

    /// Mark `key` as being expanded.
    pub fn enter(&mut self, key: impl Into<String>) {
        self.in_flight.push(key.into());
    }

    /// Pop the most recently entered key.
    pub fn leave(&mut self) -> Option<String> {
        self.in_flight.pop()
    }

    /// Number of nested expansions in flight.
    pub fn depth(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

/// Interpolation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translator {
    /// Character that starts a reference.
    pub sep0: char,
    /// Extra segment separator inside a reference, if any.
    pub sep1: Option<char>,
    /// Expansions nested deeper than this are left unexpanded.
    pub max_depth: usize,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            sep0: DEFAULT_SEP,
            sep1: Some('.'),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separators(sep0: char, sep1: Option<char>) -> Self {
        Self {
            sep0,
            sep1,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Expand every reference in `text`.
    pub fn translate<S: VarSource + ?Sized>(&self, text: &str, vars: &mut S) -> String {
        let mut guard = Guard::new();
        self.translate_guarded(text, vars, &mut guard)
    }

    /// Expand every reference in `text`, treating the keys already in
    /// `guard` as in flight.
    pub fn translate_guarded<S: VarSource + ?Sized>(
        &self,
        text: &str,
        vars: &mut S,
        guard: &mut Guard,
    ) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find(self.sep0) {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + self.sep0.len_utf8()..];
            let len = self.reference_len(after);
            if len == 0 {
                out.push(self.sep0);
                rest = after;
                continue;
            }
            let token = &rest[pos..pos + self.sep0.len_utf8() + len];
            out.push_str(&self.resolve(token, vars, guard));
            rest = &after[len..];
        }
        out.push_str(rest);
        out
    }

    /// Byte length of the reference path at the start of `s`.
    ///
    /// The path runs over identifier characters but never ends on a
    /// separator, so `"$name."` leaves the full stop in the text.
    fn reference_len(&self, s: &str) -> usize {
        let mut len = 0;
        let mut end = 0;
        for c in s.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                len += c.len_utf8();
                end = len;
            } else if c == '.' || Some(c) == self.sep1 {
                len += c.len_utf8();
            } else {
                break;
            }
        }
        end
    }

    fn resolve<S: VarSource + ?Sized>(&self, token: &str, vars: &mut S, guard: &mut Guard) -> String {
        let key = canonical_key(&extract(token, self.sep0, self.sep1));
        let value = vars.lookup(&key);

        if guard.contains(&key) {
            tracing::debug!(%key, "expansion cycle; substituting stored value");
            return value;
        }
        if guard.depth() >= self.max_depth {
            tracing::warn!(%key, depth = guard.depth(), "expansion depth limit reached");
            return value;
        }
        if !value.contains(self.sep0) {
            return value;
        }

        tracing::trace!(%key, depth = guard.depth(), "expanding");
        guard.enter(key);
        let expanded = self.translate_guarded(&value, vars, guard);
        guard.leave();
        expanded
    }
}

/// Expand `text` against `vars` with the default [`Translator`].
pub fn translate(text: &str, vars: &mut VarStore) -> String {
    Translator::default().translate(text, vars)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store(pairs: &[(&str, &str)]) -> VarStore {
        pairs.iter().copied().collect()
    }

    #[test]
    fn no_references() {
        let mut vars = VarStore::new();
        assert_eq!(translate("hello world", &mut vars), "hello world");
        assert!(vars.is_empty());
    }

    #[test]
    fn simple_reference() {
        let mut vars = store(&[("a", "5")]);
        assert_eq!(translate("$a", &mut vars), "5");
        assert_eq!(translate("x=$a;", &mut vars), "x=5;");
    }

    #[test]
    fn unassigned_reference_is_empty_and_created() {
        let mut vars = VarStore::new();
        assert_eq!(translate("[$a]", &mut vars), "[]");
        assert!(vars.contains("a"));
        assert_eq!(vars.locate("a"), "");
    }

    #[test]
    fn compound_reference() {
        let mut vars = store(&[("player.name", "Bob")]);
        assert_eq!(translate("hi $player.name!", &mut vars), "hi Bob!");
    }

    #[test]
    fn trailing_full_stop_stays_in_text() {
        let mut vars = store(&[("name", "Bob")]);
        assert_eq!(translate("Hello $name.", &mut vars), "Hello Bob.");
    }

    #[test]
    fn adjacent_references() {
        let mut vars = store(&[("a", "1"), ("b", "2")]);
        assert_eq!(translate("$a$b", &mut vars), "12");
    }

    #[test]
    fn lone_separator_is_literal() {
        let mut vars = VarStore::new();
        assert_eq!(translate("cost: 5 $ or $", &mut vars), "cost: 5 $ or $");
        assert!(vars.is_empty());
    }

    #[test]
    fn nested_values_expand() {
        let mut vars = store(&[("greeting", "hello $who"), ("who", "$name"), ("name", "world")]);
        assert_eq!(translate("$greeting!", &mut vars), "hello world!");
    }

    #[test]
    fn self_reference_terminates() {
        let mut vars = store(&[("a", "x$a")]);
        assert_eq!(translate("$a", &mut vars), "xx$a");
    }

    #[test]
    fn mutual_reference_terminates_and_is_stable() {
        let mut vars = store(&[("a", "$b"), ("b", "$a")]);
        let first = translate("$a", &mut vars);
        assert_eq!(first, "$b");
        assert_eq!(translate("$a", &mut vars), first);
        assert_eq!(translate("$b", &mut vars), "$a");
    }

    #[test]
    fn guard_is_fresh_per_call() {
        let mut vars = store(&[("a", "$b"), ("b", "leaf")]);
        let t = Translator::default();
        assert_eq!(t.translate("$a $a", &mut vars), "leaf leaf");
    }

    #[test]
    fn preseeded_guard_blocks_expansion() {
        let mut vars = store(&[("a", "$b"), ("b", "leaf")]);
        let mut guard = Guard::new();
        guard.enter("b");
        let out = Translator::default().translate_guarded("$a", &mut vars, &mut guard);
        assert_eq!(out, "leaf");
        let mut guard = Guard::new();
        guard.enter("a");
        let out = Translator::default().translate_guarded("$a", &mut vars, &mut guard);
        assert_eq!(out, "$b");
        assert_eq!(guard.depth(), 1);
    }

    #[test]
    fn depth_limit_leaves_value_unexpanded() {
        let mut vars = store(&[
            ("v0", "$v1"),
            ("v1", "$v2"),
            ("v2", "$v3"),
            ("v3", "end"),
        ]);
        let t = Translator::default().with_max_depth(2);
        assert_eq!(t.translate("$v0", &mut vars), "$v3");
        assert_eq!(Translator::default().translate("$v0", &mut vars), "end");
    }

    #[test]
    fn custom_separators() {
        let mut vars = store(&[("x.y", "ok"), ("z", "@x:y")]);
        let t = Translator::with_separators('@', Some(':'));
        assert_eq!(t.translate("@x:y / @z / $z", &mut vars), "ok / ok / $z");
    }

    #[test]
    fn without_secondary_separator_dots_stay_in_key() {
        let mut vars = store(&[("a.b", "joined")]);
        let t = Translator::with_separators('$', None);
        assert_eq!(t.translate("$a.b", &mut vars), "joined");
    }

    #[test]
    fn shared_store_source() {
        let mut shared = crate::var::SharedVarStore::from(store(&[("a", "$b"), ("b", "2")]));
        assert_eq!(Translator::default().translate("$a+$a", &mut shared), "2+2");
    }

    #[test]
    fn guard_basics() {
        let mut g = Guard::new();
        assert!(g.is_empty());
        g.enter("k");
        assert!(g.contains("k"));
        assert_eq!(g.leave().as_deref(), Some("k"));
        assert!(!g.contains("k"));
    }
}
