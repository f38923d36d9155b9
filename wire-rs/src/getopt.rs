//! Command-line arguments as a key/value map.
//!
//! Given `wire --ini=game.ini -h name=Bob`:
//!
//! | Key       | Value         |
//! |-----------|---------------|
//! | `"0"`     | `wire`        |
//! | `"1"`     | `--ini=game.ini` |
//! | `"2"`     | `-h`          |
//! | `"3"`     | `name=Bob`    |
//! | `"--ini"` | `game.ini`    |
//! | `"-h"`    | `true`        |
//! | `"name"`  | `Bob`         |
//!
//! `key=` also stores `true`.  Arguments with more than one `=` are only
//! reachable by index.

use std::collections::BTreeMap;

use crate::cast::FromVar;
use crate::text::Text;

/// Parsed arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Getopt {
    map: BTreeMap<String, String>,
}

impl Getopt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `std::env::args()`.
    pub fn from_env() -> Self {
        Self::parse(std::env::args())
    }

    /// Parse an argument vector whose first element is the program name.
    pub fn parse<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let mut map = BTreeMap::new();

        for (i, arg) in argv.iter().enumerate() {
            let tokens = Text::from(arg.as_str()).split("=");
            let tok = |n: usize| tokens.get(n).map(|t| t.data.as_str());
            match (tokens.len(), tok(0), tok(1), tok(2)) {
                (3, Some(k), Some("="), Some(v)) => {
                    map.insert(k.to_owned(), v.to_owned());
                }
                (2, Some(k), Some("="), _) => {
                    map.insert(k.to_owned(), "true".to_owned());
                }
                (1, Some(k), _, _) if i > 0 && k != argv[0] => {
                    map.insert(k.to_owned(), "true".to_owned());
                }
                _ => {}
            }
        }
        for (i, arg) in argv.into_iter().enumerate() {
            map.insert(i.to_string(), arg);
        }

        Self { map }
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Positional argument `i`.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.get(&i.to_string())
    }

    /// Value of `key` cast to `T`, or `None` when absent.
    pub fn get_as<T: FromVar>(&self, key: &str) -> Option<T> {
        self.get(key).map(T::from_var)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    /// Number of positional arguments, program name included.
    pub fn size(&self) -> usize {
        (0..).take_while(|i: &usize| self.has(&i.to_string())).count()
    }

    /// Every entry as `key=value,`, in key order.
    pub fn str(&self) -> String {
        self.map.iter().map(|(k, v)| format!("{k}={v},")).collect()
    }

    /// The positional arguments joined with spaces.
    pub fn cmdline(&self) -> String {
        (0..self.size())
            .filter_map(|i| self.arg(i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(args: &[&str]) -> Getopt {
        Getopt::parse(args.iter().copied())
    }

    #[test]
    fn indices_and_pairs() {
        let g = opts(&["app", "--user=me", "--pass=123", "-h"]);
        assert_eq!(g.arg(0), Some("app"));
        assert_eq!(g.arg(3), Some("-h"));
        assert_eq!(g.get("--user"), Some("me"));
        assert_eq!(g.get("--pass"), Some("123"));
        assert_eq!(g.get("-h"), Some("true"));
        assert_eq!(g.size(), 4);
    }

    #[test]
    fn program_name_is_not_a_flag() {
        let g = opts(&["app"]);
        assert!(!g.has("app"));
        assert_eq!(g.size(), 1);
    }

    #[test]
    fn empty_value_means_true() {
        let g = opts(&["app", "verbose="]);
        assert_eq!(g.get("verbose"), Some("true"));
        assert_eq!(g.get_as::<bool>("verbose"), Some(true));
    }

    #[test]
    fn extra_equals_only_by_index() {
        let g = opts(&["app", "a=b=c", "=x"]);
        assert!(!g.has("a"));
        assert!(!g.has(""));
        assert_eq!(g.arg(1), Some("a=b=c"));
        assert_eq!(g.size(), 3);
    }

    #[test]
    fn typed_lookup() {
        let g = opts(&["app", "--depth=12"]);
        assert_eq!(g.get_as::<usize>("--depth"), Some(12));
        assert_eq!(g.get_as::<usize>("--missing"), None);
    }

    #[test]
    fn str_and_cmdline() {
        let g = opts(&["app", "k=v"]);
        assert_eq!(g.str(), "0=app,1=k=v,k=v,");
        assert_eq!(g.cmdline(), "app k=v");
        assert_eq!(Getopt::new().cmdline(), "");
        assert_eq!(Getopt::new().size(), 0);
    }

    #[test]
    fn set_and_iter() {
        let mut g = opts(&["app"]);
        g.set("extra", "1");
        let keys: Vec<&str> = g.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["0", "extra"]);
    }
}
