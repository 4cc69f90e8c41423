use assert_cmd::Command;
use tempfile::TempDir;

/// The binary with a throwaway home so runs never touch the user's config
/// or logs. Keep the returned directory alive for the duration of the test.
fn typometer() -> (Command, TempDir) {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("typometer").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    (cmd, home)
}

#[test]
fn list_prints_builtin_passages() {
    let (mut cmd, _home) = typometer();
    let output = cmd.arg("--list").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 5);
    assert!(stdout.contains("sour grapes"));
}

#[test]
fn list_custom_prompt() {
    let (mut cmd, _home) = typometer();
    let output = cmd
        .args(["--list", "-p", "the quick brown fox"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap().trim(),
        "1  the quick brown fox"
    );
}

#[test]
fn missing_passage_file_fails() {
    let (mut cmd, _home) = typometer();
    cmd.args(["--list", "-f", "/definitely/not/here.txt"])
        .assert()
        .failure();
}

#[test]
fn non_tty_stdin_is_rejected() {
    let (mut cmd, _home) = typometer();
    cmd.args(["-p", "hi", "--no-log"])
        .write_stdin("")
        .assert()
        .failure();
}
