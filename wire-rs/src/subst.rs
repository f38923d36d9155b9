//! Multi-pattern priority substitution.
//!
//! A [`RuleSet`] is an ordered `pattern → replacement` table.  Substitution
//! scans the input once, left to right.  At every position the rules are
//! tried from the most recently registered to the oldest and the first one
//! whose pattern starts there is applied; its replacement is emitted and the
//! scan resumes after the matched span.  When nothing matches, one character
//! is copied through.  Output is never rescanned.
//!
//! The scan is driven by a leftmost-first [`AhoCorasick`] automaton built over
//! the patterns in priority order: leftmost-first picks the earliest starting
//! position and, among patterns starting there, the one listed first, which
//! is exactly the per-position priority rule above.

use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

/// Ordered substitution rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(String, String)>,
    /// Compiled on first use; reset by every mutation.
    compiled: OnceLock<Compiled>,
}

#[derive(Debug, Clone)]
struct Compiled {
    ac: AhoCorasick,
    /// Replacement text per automaton pattern id.
    replacements: Vec<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pattern → replacement`.
    ///
    /// Re-registering an existing pattern replaces its replacement but keeps
    /// its original priority.
    pub fn insert(&mut self, pattern: impl Into<String>, replacement: impl Into<String>) {
        let pattern = pattern.into();
        let replacement = replacement.into();
        match self.rules.iter_mut().find(|(p, _)| *p == pattern) {
            Some((_, r)) => *r = replacement,
            None => self.rules.push((pattern, replacement)),
        }
        self.compiled = OnceLock::new();
    }

    /// Replacement registered for `pattern`.
    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, r)| r.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in registration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> {
        self.rules.iter().map(|(p, r)| (p.as_str(), r.as_str()))
    }

    /// Rules in priority order (most recently registered first).
    pub fn iter_rev(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().rev()
    }

    /// Apply the rules to `text` in a single pass.
    pub fn substitute(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let compiled = self.compiled.get_or_init(|| self.compile());
        if compiled.replacements.is_empty() {
            return text.to_owned();
        }
        compiled.ac.replace_all(text, &compiled.replacements)
    }

    fn compile(&self) -> Compiled {
        // Empty patterns would match at every position without consuming input.
        let (patterns, replacements): (Vec<&str>, Vec<String>) = self
            .iter_rev()
            .filter(|(p, _)| !p.is_empty())
            .map(|(p, r)| (p, r.to_owned()))
            .unzip();
        tracing::trace!(rules = patterns.len(), "compiling substitution automaton");
        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .build(&patterns);
        Compiled { ac, replacements }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rules = RuleSet::new();
        rules.extend(iter);
        rules
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for RuleSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Convenience: `rules.substitute(text)`.
pub fn substitute(text: &str, rules: &RuleSet) -> String {
    rules.substitute(text)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
