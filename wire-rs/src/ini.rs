//! INI reader and writer.
//!
//! ```text
//! ; comment
//! top=level
//! [section]
//! key = value   ; trailing comment
//! ```
//!
//! Entries are stored under `section.key` (plain `key` before the first
//! section header).  Keys and values are trimmed; a value may be empty.
//!
//! A value wrapped in double quotes keeps its surrounding whitespace and any
//! `;`.  Inside quotes, `\"`, `\\`, `\r` and `\n` are escapes.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::subst::RuleSet;
use crate::var::VarStore;

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IniErrorKind {
    #[error("malformed section header `{0}`")]
    BadSection(String),
    #[error("missing key before `=`")]
    EmptyKey,
    #[error("expected `key=value` or `[section]`, found `{0}`")]
    Unrecognised(String),
}

#[derive(Debug, Error)]
pub enum IniError {
    #[error("line {line}: {kind}")]
    Syntax { line: usize, kind: IniErrorKind },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Line grammar.
struct Grammar {
    section: Regex,
    pair: Regex,
}

fn grammar() -> &'static Grammar {
    static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
    GRAMMAR.get_or_init(|| Grammar {
        section: Regex::new(r"^\[\s*([^\[\]=]*?)\s*\]$").expect("section pattern is valid"),
        pair: Regex::new(r"^([^=\[\]]*)=(.*)$").expect("pair pattern is valid"),
    })
}

/// `raw` up to the first `;` that is not inside double quotes.
fn strip_comment(raw: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &raw[..i],
            _ => {}
        }
    }
    raw
}

/// Value as written in a file: quoted when it would not survive a load.
fn quote(value: &str) -> String {
    let needs_quotes = value.contains([';', '"', '\r', '\n'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if !needs_quotes {
        return value.to_owned();
    }
    let mut out = String::from('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Inverse of [`quote`] for an already trimmed value.
fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_owned();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// An ordered `section.key → value` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ini {
    entries: BTreeMap<String, String>,
}

impl Ini {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with the entries parsed from `text`.
    ///
    /// Parsing stops at the first bad line; entries before it are kept.
    pub fn load(&mut self, text: &str) -> Result<(), IniError> {
        self.entries.clear();
        let grammar = grammar();
        let mut section = String::new();

        for (i, raw) in text.split(['\r', '\n']).enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            let syntax = |kind| IniError::Syntax { line: line_number(text, i), kind };

            if let Some(caps) = grammar.section.captures(line) {
                section = caps[1].to_owned();
            } else if line.starts_with('[') {
                return Err(syntax(IniErrorKind::BadSection(line.to_owned())));
            } else if let Some(caps) = grammar.pair.captures(line) {
                let key = caps[1].trim();
                if key.is_empty() {
                    return Err(syntax(IniErrorKind::EmptyKey));
                }
                let name = if section.is_empty() {
                    key.to_owned()
                } else {
                    format!("{section}.{key}")
                };
                self.entries.insert(name, unquote(caps[2].trim()));
            } else {
                return Err(syntax(IniErrorKind::Unrecognised(line.to_owned())));
            }
        }

        tracing::debug!(entries = self.entries.len(), "ini loaded");
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> Result<(), IniError> {
        let text = std::fs::read_to_string(path)?;
        self.load(&text)
    }

    /// Serialise with `\r\n` line endings, sectionless keys first.
    ///
    /// Values with a `;`, a quote, a line break or surrounding whitespace are
    /// written quoted, so [`Ini::load`] reads back exactly what was saved.
    pub fn save(&self) -> String {
        let mut out = String::from("; auto-generated by wire\r\n");
        let (plain, sectioned): (Vec<_>, Vec<_>) =
            self.entries.iter().partition(|(k, _)| !k.contains('.'));

        for (k, v) in plain {
            out.push_str(&format!("{k}={}\r\n", quote(v)));
        }
        let mut current: Option<&str> = None;
        for (name, v) in sectioned {
            let (section, key) = name.split_once('.').unwrap_or(("", name.as_str()));
            if current != Some(section) {
                out.push_str(&format!("\r\n[{section}]\r\n"));
                current = Some(section);
            }
            out.push_str(&format!("{key}={}\r\n", quote(v)));
        }
        out
    }

    pub fn save_file(&self, path: &Path) -> Result<(), IniError> {
        std::fs::write(path, self.save())?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries as substitution rules (`name → value`), in name order.
    pub fn rules(&self) -> RuleSet {
        self.iter().collect()
    }

    /// Assign every entry into `vars`.
    pub fn apply_to(&self, vars: &mut VarStore) {
        for (k, v) in self.iter() {
            vars.assign(k, v);
        }
    }
}

/// 1-based line number of the `i`th CR/LF-separated piece.
///
/// `\r\n` yields an empty piece between the two characters; those are not
/// counted as lines.
fn line_number(text: &str, i: usize) -> usize {
    let mut line = 1;
    let mut prev = '\0';
    for c in text.chars().filter(|c| *c == '\r' || *c == '\n').take(i) {
        if !(prev == '\r' && c == '\n') {
            line += 1;
        }
        prev = c;
    }
    line
}

// ── Tests ─────────────────────────────────────────────────────────────────────
