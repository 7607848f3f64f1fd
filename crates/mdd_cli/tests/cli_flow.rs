use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cli_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("mdd"))
}

#[test]
fn calculate_then_lookup() {
    let tmp = tempdir().expect("tempdir");
    let corpus = tmp.path().join("corpus");
    fs::create_dir_all(corpus.join("nested")).unwrap();
    fs::write(corpus.join("a.txt"), "file").unwrap();
    fs::write(corpus.join("nested/b.txt"), "another file").unwrap();
    let filter = tmp.path().join("known.bloom");
    let filter = filter.to_str().unwrap();
    let corpus = corpus.to_str().unwrap();

    cli_cmd()
        .args(["calculate", filter, corpus])
        .assert()
        .success()
        .stdout(predicate::str::contains("Counted 2 files."))
        .stdout(predicate::str::contains("[+] Done."));

    cli_cmd()
        .args(["lookup", filter, corpus])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt is in filter"))
        .stdout(predicate::str::contains("b.txt is in filter"));

    let other = tmp.path().join("other.txt");
    fs::write(&other, "never hashed").unwrap();
    cli_cmd()
        .args(["lookup", filter, other.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("other.txt"));
}

#[test]
fn fromfile_builds_filter() {
    let tmp = tempdir().expect("tempdir");
    let list = tmp.path().join("hashes.txt");
    // md5("file")
    fs::write(&list, "# corpus\n8c7dd922ad47494fc02c388e12c00eac\nbogus line\n").unwrap();
    let filter = tmp.path().join("list.bloom");

    cli_cmd()
        .args(["fromfile", filter.to_str().unwrap(), list.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Counted 1 hashes."));

    let target = tmp.path().join("file.txt");
    fs::write(&target, "file").unwrap();
    cli_cmd()
        .args(["lookup", filter.to_str().unwrap(), target.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("file.txt is in filter"));
}

#[test]
fn info_reports_header() {
    let tmp = tempdir().expect("tempdir");
    let corpus = tmp.path().join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    for i in 0..3 {
        fs::write(corpus.join(format!("{i}.bin")), format!("payload {i}")).unwrap();
    }
    let filter = tmp.path().join("three.bloom");
    cli_cmd()
        .args(["calculate", filter.to_str().unwrap(), corpus.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(fs::metadata(&filter).unwrap().len(), 32 + 4);
    cli_cmd()
        .args(["info", filter.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("size      : 28 bits"))
        .stdout(predicate::str::contains("hashes    : 6"))
        .stdout(predicate::str::contains("4.0bytes"));
}

#[test]
fn missing_or_truncated_filter_fails() {
    let tmp = tempdir().expect("tempdir");
    let filter = tmp.path().join("absent.bloom");
    cli_cmd()
        .args(["lookup", filter.to_str().unwrap(), tmp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to open"));

    fs::write(&filter, [28u8, 0, 0]).unwrap();
    cli_cmd()
        .args(["info", filter.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("truncated filter"));
}

#[test]
fn empty_corpus_is_rejected() {
    let tmp = tempdir().expect("tempdir");
    let corpus = tmp.path().join("empty");
    fs::create_dir_all(&corpus).unwrap();
    cli_cmd()
        .args(["calculate", tmp.path().join("f.bloom").to_str().unwrap(), corpus.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected item count"));
}

#[test]
fn lists_local_filters() {
    let home = tempdir().expect("tempdir");
    fs::create_dir_all(home.path().join("filters")).unwrap();
    fs::write(home.path().join("filters/local.bloom"), b"bits").unwrap();

    cli_cmd()
        .env("MDD_HOME", home.path())
        .args(["filters", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filter"))
        .stdout(predicate::str::contains("local.bloom"));

    assert!(home.path().join("config.json").exists());
    assert!(home.path().join("installed.json").exists());
}
