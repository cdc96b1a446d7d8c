use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn bin_path() -> String {
    if let Ok(path) = env::var("CARGO_BIN_EXE_rill") {
        return path;
    }
    let mut fallback =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir not set by cargo"));
    fallback.push("target");
    fallback.push("debug");
    fallback.push("rill");
    if cfg!(windows) {
        fallback.set_extension("exe");
    }
    if fallback.exists() {
        return fallback.to_string_lossy().into_owned();
    }
    panic!(
        "binary path not set by cargo test and fallback {:?} not found",
        fallback
    );
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(bin_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn rill");
    child
        .stdin
        .as_mut()
        .expect("stdin not piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write program to stdin");
    child.wait_with_output().expect("failed to wait for rill")
}

fn run_program(source: &str) -> Output {
    run_with_stdin(&[], source)
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is UTF-8")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("stderr is UTF-8")
}

#[test]
fn precedence_end_to_end() {
    let output = run_program("println(2 + 3 * 4);");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "14\n");
}

#[test]
fn while_loop_prints_each_iteration() {
    let output = run_program("var x = 1; while (x < 4) { println(x); x += 1; }");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "1\n2\n3\n");
}

#[test]
fn functions_apply_their_arguments() {
    let output =
        run_program("let add = func(a, b) { return a + b; }; println(add(3, 4));");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "7\n");
}

#[test]
fn arrays_subscript_and_measure() {
    let output = run_program("let a = [10, 20, 30]; println(a[1], length(a));");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "20 3\n");
}

#[test]
fn objects_access_and_mutate_members() {
    let output =
        run_program("let o = { name: \"k\", n: 2 }; o.n = 5; println(o.name, o.n);");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "k 5\n");
}

#[test]
fn recursion_end_to_end() {
    let output = run_program(
        "let fact = func(n) { if (n < 2) { return 1; } return n * fact(n - 1); }; println(fact(5));",
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "120\n");
}

#[test]
fn run_flag_takes_the_program_from_the_argument() {
    let output = run_with_stdin(&["-r", "println(1 + 1);"], "");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "2\n");
}

#[test]
fn script_files_run_from_disk() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("program.rill");
    std::fs::write(&path, "println(\"from a file\");").expect("failed to write script");

    let output = run_with_stdin(&[path.to_str().unwrap()], "");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "from a file\n");
}

#[test]
fn missing_file_reports_and_fails() {
    let output = run_with_stdin(&["/nonexistent/really-not-here.rill"], "");
    assert!(!output.status.success());
}

#[test]
fn read_consumes_whitespace_delimited_words() {
    let output = run_with_stdin(
        &["-r", "let a = read(); let b = read(); println(b, a);"],
        "first second\n",
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "second first\n");
}

#[test]
fn read_preserves_multi_byte_characters() {
    let output = run_with_stdin(
        &["-r", "let word = read(); println(word, length(word));"],
        "héllo\n",
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "héllo 5\n");
}

#[test]
fn let_without_initializer_fails_to_parse() {
    let output = run_program("let x;");
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("ERROR"));
}

#[test]
fn redeclaration_fails_to_parse() {
    let output = run_program("var x; x = 1; let x = 2;");
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("ERROR"));
}

#[test]
fn assigning_a_constant_fails_to_parse() {
    let output = run_program("let x = 1; x = 2;");
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("ERROR"));
}

#[test]
fn break_after_a_loop_fails_to_parse() {
    let output = run_program("while (true) {} break;");
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("ERROR"));
}

#[test]
fn diagnostics_carry_file_line_and_column() {
    let output = run_program("var x = 1;\nlet y;\n");
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("ERROR (stdin):1:4:"));
}

#[test]
fn runtime_errors_exit_nonzero() {
    let output = run_program("var a = [1]; println(a[5]);");
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("runtime error"));
    assert!(stderr_of(&output).contains("out of bounds"));
}

#[test]
fn print_tokens_dumps_the_stream() {
    let output = run_with_stdin(&["--print-tokens", "-r", "var x = 1;"], "");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("builtin"));
    assert!(stdout.contains("identifier"));
    assert!(stdout.contains("number"));
}

#[test]
fn print_ast_dumps_the_tree() {
    let output = run_with_stdin(&["--print-ast", "-r", "println(1 + 2);"], "");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("(global scope"));
    assert!(stdout.contains("(+"));
    // Evaluation still happens after the dump.
    assert!(stdout.ends_with("3\n"));
}

#[test]
fn ignore_errors_still_evaluates_but_fails() {
    // `@` is a lexical error; the remainder of the program is intact.
    let output = run_with_stdin(&["-E", "-r", "@ println(7);"], "");
    assert!(!output.status.success());
    assert_eq!(stdout_of(&output), "7\n");
    assert!(stderr_of(&output).contains("ERROR"));
}

#[test]
fn lex_errors_block_evaluation_without_the_flag() {
    let output = run_with_stdin(&["-r", "@ println(7);"], "");
    assert!(!output.status.success());
    assert_eq!(stdout_of(&output), "");
    assert!(stderr_of(&output).contains("exiting with 1 error"));
}

#[test]
fn empty_program_succeeds() {
    let output = run_program("");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "");
}

#[test]
fn value_semantics_observed_end_to_end() {
    let output = run_program(
        "let a = 1; var b = a; b = 2; println(a);\
         let xs = [1]; var ys = xs; ys[0] = 2; println(xs[0]);",
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "1\n2\n");
}

#[test]
fn comments_are_ignored_by_execution() {
    let output = run_program("# leading comment\nprintln(1); #- block\nstill comment -# println(2);");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "1\n2\n");
}

#[test]
fn demo_scripts_print_their_expected_output() {
    let root = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").expect("manifest dir not set by cargo"),
    );
    let cases = [
        (
            "fibonacci.rill",
            "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n[0, 1, 1, 2, 3, 5, 8, 13, 21, 34]\n",
        ),
        ("collatz.rill", "6 8\n7 16\n27 111\n"),
        ("closures.rill", "3\n32\n"),
        ("records.rill", "alpha 1\nbeta 2\n2 1\n"),
    ];

    for (script, expected) in cases {
        let path = root.join("demos").join(script);
        let output = run_with_stdin(&[path.to_str().unwrap()], "");
        assert!(
            output.status.success(),
            "{script} failed: {}",
            stderr_of(&output)
        );
        assert_eq!(stdout_of(&output), expected, "wrong output for {script}");
    }
}

#[test]
fn string_escapes_print_decoded() {
    let output = run_program(r#"println("a\tb", 'it\'s');"#);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "a\tb it's\n");
}
