use std::path::Path;

use wire::{declare, try_eval, Getopt, Ini, Translator, VarStore};

const USAGE: &str = "Usage: wire [--ini=<file>] [--eval=<expr>] [--sep=<c>] [name=value]... [text]...";

const OPTIONS: &[&str] = &["--ini", "--eval", "--sep", "--help", "-h"];

const VALUED: &[&str] = &["--ini", "--eval", "--sep"];

fn main() {
    wire::init_tracing();

    let opts = Getopt::from_env();
    if opts.has("--help") || opts.has("-h") {
        println!("{USAGE}");
        return;
    }

    if let Err(e) = run(&opts) {
        eprintln!("wire: {e}");
        std::process::exit(1);
    }
}

/// Options given as `--name=value`, keyed by name.
///
/// Read from the raw argument rather than the parsed map so values may
/// themselves contain `=`.
fn option_value<'a>(opts: &'a Getopt, name: &str) -> Option<&'a str> {
    (1..opts.size())
        .filter_map(|i| opts.arg(i))
        .filter_map(|arg| arg.split_once('='))
        .filter(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .last()
}

fn run(opts: &Getopt) -> Result<(), String> {
    let mut translator = Translator::default();
    if let Some(sep) = option_value(opts, "--sep") {
        let mut chars = sep.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => translator.sep0 = c,
            _ => return Err(format!("--sep expects one character, got `{sep}`")),
        }
    }

    let mut vars = VarStore::new();

    // ── INI file ──────────────────────────────────────────────────────────────
    if let Some(path) = option_value(opts, "--ini") {
        let mut ini = Ini::new();
        ini.load_file(Path::new(path))
            .map_err(|e| format!("{path}: {e}"))?;
        ini.apply_to(&mut vars);
    }

    // ── Positional arguments ──────────────────────────────────────────────────
    let mut texts = Vec::new();
    for i in 1..opts.size() {
        let Some(arg) = opts.arg(i) else { continue };
        if arg.starts_with('-') {
            let (name, value) = arg.split_once('=').map_or((arg, None), |(k, v)| (k, Some(v)));
            if !OPTIONS.contains(&name) {
                return Err(format!("unknown option `{name}`\n{USAGE}"));
            }
            if value.is_none() && VALUED.contains(&name) {
                return Err(format!("`{name}` needs a value: `{name}=...`"));
            }
            continue;
        }
        match arg.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                *declare(&mut vars, name) = value.to_owned();
            }
            _ => texts.push(arg),
        }
    }

    for text in texts {
        println!("{}", translator.translate(text, &mut vars));
    }

    // ── Expression ────────────────────────────────────────────────────────────
    if let Some(expr) = option_value(opts, "--eval") {
        let expanded = translator.translate(expr, &mut vars);
        let value = try_eval(&expanded).map_err(|e| format!("{expanded}: {e}"))?;
        println!("{value}");
    }

    Ok(())
}
