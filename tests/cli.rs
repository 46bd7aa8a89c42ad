use assert_cmd::Command;
use predicates::prelude::*;

fn notes() -> Command {
    let mut cmd = Command::cargo_bin("notes").unwrap();
    cmd.env_remove("GROQ_API_KEY");
    cmd
}

#[test]
fn help_lists_subcommands() {
    notes()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("notes"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("sources"));
}

#[test]
fn sources_lists_video_and_articles() {
    notes()
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("youtu.be"))
        .stdout(predicate::str::contains("OCR"));
}

#[test]
fn blank_url_is_rejected_with_warning() {
    notes()
        .args(["notes", "   "])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please enter a valid URL."));
}

#[test]
fn unknown_format_is_a_usage_error() {
    notes()
        .args(["notes", "https://example.com", "--format", "srt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("srt"));
}
