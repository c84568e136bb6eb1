use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const GRAMMAR: &str = r#"%{
#include "host.h"
%}
%term leaf = 1 plus = 2
%%
stmt: reg;
reg:  leaf           "mov %0\n"     1;
reg:  plus(reg, reg) "add %0, %1\n" 2;
%%
/* host code */
"#;

fn treeburg(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_treeburg"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run treeburg")
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn test_gen_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.brg"), GRAMMAR).unwrap();

    let out = treeburg(&["gen", "x.brg", "-o", "x.c"], dir.path());
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("Generated x.brg -> x.c"));

    let code = fs::read_to_string(dir.path().join("x.c")).unwrap();
    assert!(code.starts_with("#include \"host.h\""));
    assert!(code.contains("static void _label(NODE_TYPE *t)"));
    assert!(code.ends_with("/* host code */\n"));
}

#[test]
fn test_gen_to_stdout_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.brg"), GRAMMAR).unwrap();

    let first = treeburg(&["gen", "x.brg"], dir.path());
    let second = treeburg(&["gen", "x.brg"], dir.path());
    assert!(first.status.success());
    assert!(!stdout(&first).is_empty());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_gen_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_treeburg"))
        .args(["gen", "-", "--prefix", "burm_"])
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn treeburg");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(GRAMMAR.as_bytes())
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("struct burm_state {"));
}

#[test]
fn test_config_file_and_flag_override() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.brg"), GRAMMAR).unwrap();
    fs::write(
        dir.path().join("treeburg.toml"),
        "[generate]\nprefix = \"cfg_\"\ntrace = true\n",
    )
    .unwrap();

    let out = treeburg(&["gen", "x.brg"], dir.path());
    let code = stdout(&out);
    assert!(code.contains("struct cfg_state {"));
    assert!(code.contains("cfg_trace(t, "));

    let out = treeburg(&["gen", "x.brg", "--prefix", "cli_"], dir.path());
    let code = stdout(&out);
    assert!(code.contains("struct cli_state {"));
    assert!(code.contains("cli_trace(t, "));
}

#[test]
fn test_trace_flag() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.brg"), GRAMMAR).unwrap();
    let plain = treeburg(&["gen", "x.brg"], dir.path());
    assert!(!stdout(&plain).contains("_trace("));
    let traced = treeburg(&["gen", "x.brg", "-T"], dir.path());
    assert!(stdout(&traced).contains("_trace(t, 2, c, p->costs[_reg_NT]);"));
}

#[test]
fn test_gen_error_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.brg"), "%term leaf = 1\n%%\nreg: mul(reg);\n").unwrap();

    let out = treeburg(&["gen", "bad.brg", "-o", "bad.c"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("undefined terminal 'mul'"));
    assert!(!dir.path().join("bad.c").exists());
}

#[test]
fn test_gen_rejects_bad_prefix() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.brg"), GRAMMAR).unwrap();
    let out = treeburg(&["gen", "x.brg", "--prefix", "9x"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid prefix '9x'"));
}

#[test]
fn test_gen_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let out = treeburg(&["gen", "nope.brg"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("cannot read 'nope.brg'"));
}

#[test]
fn test_check_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("x.brg"), GRAMMAR).unwrap();
    let out = treeburg(&["check", "x.brg"], dir.path());
    assert!(out.status.success());
    let err = stderr(&out);
    assert!(err.contains("OK: x.brg"));
    assert!(err.contains("2 terminals, 2 nonterminals, 3 rules (1 chain)"));
    assert!(err.contains("state: 3 rule bits per node"));
    assert!(stdout(&out).is_empty());
}

#[test]
fn test_check_reports_warnings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("w.brg"),
        "%term leaf = 1 spare = 2\n%%\nstmt: leaf;\n",
    )
    .unwrap();
    let out = treeburg(&["check", "w.brg"], dir.path());
    assert!(out.status.success());
    let err = stderr(&out);
    assert!(err.contains("terminal 'spare' is never used in a pattern"));
    assert!(err.contains("1 warning(s)"));
}
