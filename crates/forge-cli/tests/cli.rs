use assert_cmd::Command;
use predicates::prelude::*;

fn forge() -> Command {
    Command::cargo_bin("forge").unwrap()
}

#[test]
fn evaluates_a_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fact.forge");
    std::fs::write(
        &path,
        "# recursive factorial\ndef f dup 1 gt if dup 1 sub f mul end end\n5 f print\n",
    )
    .unwrap();

    forge().arg(&path).assert().success().stdout("120\n");
}

#[test]
fn missing_script_file_fails() {
    forge()
        .arg("no/such/file.forge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no/such/file.forge"));
}

#[test]
fn eval_flag_runs_a_one_liner() {
    forge()
        .args(["--eval", "1 2 add print"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn runtime_errors_exit_one() {
    forge()
        .args(["-e", "1 0 div"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("division by zero"));
}

#[test]
fn parse_errors_exit_two() {
    forge()
        .args(["-e", "1 end"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn repl_evaluates_lines_until_exit() {
    forge()
        .write_stdin("1 2 add print\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}

#[test]
fn repl_echoes_a_grown_stack() {
    forge()
        .write_stdin("41 1 add\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));
}

#[test]
fn repl_keeps_the_stack_across_an_error() {
    forge()
        .write_stdin("1 2\nbogus\nadd print\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("3"))
        .stderr(predicate::str::contains("unknown word"));
}

#[test]
fn repl_reads_continuation_lines_for_open_blocks() {
    forge()
        .write_stdin("def twice\n2 mul\nend\n5 twice print\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("10"));
}

#[test]
fn repl_exits_on_eof() {
    forge().write_stdin("7 print\n").assert().success();
}
