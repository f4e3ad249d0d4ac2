use helpers::TestCase;
use pretty_assertions::assert_eq;

mod helpers;

const NOTE_1_0_1: &str = r#"DiffView 1.0.1
==============

Syntax highlighting in the diff views is now on by default. To turn it off,
add this to your DiffView settings:

    {
        "syntax_highlight": false
    }

 ____  _  __  __
|  _ \(_)/ _|/ _|
| | | | | |_| |_ v  V /

Questions or problems? https://github.com/CJTozer/SublimeDiffView/issues
"#;

#[test]
fn list_in_version_order() {
    let test_case = TestCase::new()
        .with_note("1.0.1", NOTE_1_0_1)
        .with_note("0.9.0", "old news\n")
        .with_note("1.0.0-rc.1", "almost\n");

    test_case
        .command()
        .args(["notes", "list"])
        .assert()
        .success()
        .stdout_eq("0.9.0\n1.0.0-rc.1\n1.0.1\n");
}

#[test]
fn list_without_notes() {
    TestCase::new()
        .command()
        .args(["notes", "list"])
        .assert()
        .success()
        .stdout_eq("");
}

#[test]
fn show_is_byte_for_byte() {
    let test_case = TestCase::new().with_note("1.0.1", NOTE_1_0_1);

    let output = test_case
        .command()
        .args(["notes", "show", "1.0.1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), NOTE_1_0_1);
}

#[test]
fn show_missing_version() {
    let test_case = TestCase::new();

    let assert = test_case
        .command()
        .args(["notes", "show", "9.9.9"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(
        stderr.contains("There is no release note for version 9.9.9"),
        "{stderr}"
    );
}

#[test]
fn show_invalid_version() {
    TestCase::new()
        .command()
        .args(["notes", "show", "latest"])
        .assert()
        .failure();
}

#[test]
fn upgrade_between_versions() {
    let test_case = TestCase::new()
        .with_note("1.0.0", "first\n")
        .with_note("1.0.1", "second\n")
        .with_note("1.1.0", "third\n");

    test_case
        .command()
        .args(["notes", "upgrade", "--from", "1.0.0", "--to", "1.1.0"])
        .assert()
        .success()
        .stdout_eq("## 1.0.1\n\nsecond\n\n## 1.1.0\n\nthird\n");
}

#[test]
fn upgrade_with_nothing_to_announce() {
    let test_case = TestCase::new().with_note("1.0.0", "first\n");

    test_case
        .command()
        .args(["notes", "upgrade", "--from", "1.0.0", "--to", "1.0.3"])
        .assert()
        .success()
        .stdout_eq("");
}

#[test]
fn add_from_stdin() {
    let test_case = TestCase::new();

    test_case
        .command()
        .args(["notes", "add", "1.0.1"])
        .stdin(NOTE_1_0_1)
        .assert()
        .success();
    assert_eq!(test_case.read("messages/1.0.1.txt"), NOTE_1_0_1);
}

#[test]
fn add_existing_version() {
    let test_case = TestCase::new()
        .with_note("1.0.1", "original\n")
        .with_file("draft.txt", "replacement\n");

    test_case
        .command()
        .args(["notes", "add", "1.0.1", "--file", "draft.txt"])
        .assert()
        .failure();
    assert_eq!(test_case.read("messages/1.0.1.txt"), "original\n");
}

#[test]
fn add_dry_run() {
    let test_case = TestCase::new().with_file("draft.txt", "maybe\n");

    test_case
        .command()
        .args(["notes", "add", "2.0.0", "--file", "draft.txt", "--dry-run"])
        .assert()
        .success();
    assert!(!test_case.path().join("messages").exists());
}

#[test]
fn configured_notes_directory() {
    let test_case = TestCase::new().with_file("diffview.toml", "[notes]\ndir = \"release\"\n");
    std::fs::create_dir(test_case.path().join("release")).unwrap();
    std::fs::write(test_case.path().join("release").join("3.0.0.txt"), "three\n").unwrap();

    test_case
        .command()
        .args(["notes", "list"])
        .assert()
        .success()
        .stdout_eq("3.0.0\n");
}

#[test]
fn invalid_config() {
    TestCase::new()
        .with_file("diffview.toml", "[notes]\nfolder = \"release\"\n")
        .command()
        .args(["notes", "list"])
        .assert()
        .failure();
}
