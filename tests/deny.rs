use std::io::Write;
use std::process::{Command, Stdio};

const CLEAN_DIFF: &str = "diff --git a/src/lib.rs b/src/lib.rs\n\
--- a/src/lib.rs\n\
+++ b/src/lib.rs\n\
@@ -1,2 +1,3 @@\n \
fn main() {\n\
+    let x = compute()?;\n \
}\n";

const VIOLATING_DIFF: &str = "diff --git a/src/lib.rs b/src/lib.rs\n\
--- a/src/lib.rs\n\
+++ b/src/lib.rs\n\
@@ -1,2 +1,3 @@\n \
fn main() {\n\
+    let x = compute().unwrap();\n \
}\n";

fn run_check(diff: &str, deny: bool) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_faultline"));
    cmd.arg("check");
    if deny {
        cmd.arg("--deny");
    }
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(diff.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn deny_exits_zero_on_clean_diff() {
    let output = run_check(CLEAN_DIFF, true);
    assert!(
        output.status.success(),
        "clean diff should pass --deny: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn deny_exits_one_on_violation() {
    let output = run_check(VIOLATING_DIFF, true);
    assert!(!output.status.success(), "unwrap in added line should fail --deny");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn check_without_deny_always_exits_zero() {
    let output = run_check(VIOLATING_DIFF, false);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unwrap"), "report should mention unwrap: {stdout}");
}
