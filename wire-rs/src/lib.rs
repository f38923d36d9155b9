//! String interpolation toolkit.
//!
//! | Module        | Purpose                                             |
//! |---------------|-----------------------------------------------------|
//! | [`pattern`]   | `*` / `?` glob matching                             |
//! | [`subst`]     | priority multi-pattern replacement                  |
//! | [`var`]       | variable store                                      |
//! | [`reference`] | `$a.b` reference decoding                           |
//! | [`translate`] | recursive `$name` expansion                         |
//! | [`expr`]      | arithmetic evaluation                               |
//! | [`cast`]      | typed reads from the store                          |
//! | [`text`]      | extended string and string list                     |
//! | [`getopt`]    | argv as a key/value map                             |
//! | [`ini`]       | INI reader and writer                               |

pub mod cast;
pub mod expr;
pub mod getopt;
pub mod ini;
pub mod pattern;
pub mod reference;
pub mod subst;
pub mod text;
pub mod translate;
pub mod var;

pub use cast::{declare, read, read_as, FromVar};
pub use expr::{eval, try_eval, ExprError};
pub use getopt::Getopt;
pub use ini::{Ini, IniError, IniErrorKind};
pub use pattern::{glob_match, glob_match_ci};
pub use reference::{canonical_key, extract, extract_default};
pub use subst::{substitute, RuleSet};
pub use text::{
    format_each, format_keys, format_pairs, format_values, parse_precise, precise, Strings, Text,
};
pub use translate::{translate, Guard, Translator};
pub use var::{SharedVarStore, VarSource, VarStore};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
