use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    Command::cargo_bin("drivescope").unwrap()
}

#[test]
fn password_and_keychain_are_rejected_together() {
    cmd()
        .args(["--password", "hunter2", "--keychain"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn short_password_and_keychain_forms_are_rejected_together() {
    cmd()
        .args(["-P", "hunter2", "-K"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn help_lists_the_login_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--email"))
        .stdout(contains("--password"))
        .stdout(contains("--keychain"));
}
