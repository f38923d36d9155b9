//! Run the `wire` binary and check its output.

use std::process::{Command, Output};

use pretty_assertions::assert_eq;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn wire(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wire"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("cannot run wire: {e}"))
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ── Translation ───────────────────────────────────────────────────────────────

#[test]
fn assigns_then_translates() {
    let out = wire(&["hi $name.", "name=Bob", "$greet", "greet=hello $name"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "hi Bob.\nhello Bob\n");
}

#[test]
fn compound_names() {
    let out = wire(&["$player.name=Ann", "[$player.name]"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "[Ann]\n");
}

#[test]
fn custom_separator() {
    let out = wire(&["--sep=@", "x=1", "@x $x"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "1 $x\n");
}

#[test]
fn cyclic_definitions_terminate() {
    let out = wire(&["a=$b", "b=$a", "$a"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "$b\n");
}

// ── Evaluation ────────────────────────────────────────────────────────────────

#[test]
fn eval_after_translation() {
    let out = wire(&["a=3", "--eval=$a*2+1"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "7\n");
}

#[test]
fn eval_error_is_fatal() {
    let out = wire(&["--eval=1+"]);
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("wire: 1+: "), "{}", stderr(&out));
}

#[test]
fn eval_value_with_equals_is_not_dropped() {
    let out = wire(&["--eval=a=b"]);
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("wire: a=b: "), "{}", stderr(&out));
}

#[test]
fn option_without_value_is_rejected() {
    let out = wire(&["--eval"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("`--eval` needs a value"), "{}", stderr(&out));
}

// ── INI files ─────────────────────────────────────────────────────────────────

#[test]
fn ini_values_are_variables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.ini");
    std::fs::write(&path, "; test\n[player]\nhp = 10\n").unwrap();
    let ini_arg = format!("--ini={}", path.display());

    let out = wire(&[&ini_arg, "hp: $player.hp"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "hp: 10\n");
}

#[test]
fn ini_path_may_contain_equals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x=y.ini");
    std::fs::write(&path, "[p]\nname=Ann\n").unwrap();
    let ini_arg = format!("--ini={}", path.display());

    let out = wire(&[&ini_arg, "$p.name"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "Ann\n");
}

#[test]
fn missing_ini_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let ini_arg = format!("--ini={}", dir.path().join("absent.ini").display());
    let out = wire(&[&ini_arg]);
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("wire: "));
}

// ── Options ───────────────────────────────────────────────────────────────────

#[test]
fn help_prints_usage() {
    let out = wire(&["-h"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("Usage: wire"));
}

#[test]
fn unknown_option_is_rejected() {
    let out = wire(&["--bogus"]);
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("wire: unknown option `--bogus`"));
}

#[test]
fn bad_separator_is_rejected() {
    let out = wire(&["--sep=ab"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--sep"));
}
