//! # CLI Tests
//!
//! Drives the `check` and `describe` handlers directly, and the built
//! binary for exit codes.

use std::fs;
use std::path::Path;
use std::process::Command;

use pathspec_cli::check::{self, CheckArgs, OutputFormat};
use pathspec_cli::describe::{self, DescribeArgs};
use pathspec_cli::Status;

const MANIFEST: &str = r#"
root: directory
containing_exactly:
  - file: VERSION
    content: { matches: '^1\.' }
  - dir: bin
    containing:
      - file: run
        size: { gt: 0 }
  - no_file: debug.log
"#;

fn release(root: &Path) {
    fs::write(root.join("VERSION"), "1.4.2\n").unwrap();
    fs::create_dir(root.join("bin")).unwrap();
    fs::write(root.join("bin/run"), "#!/bin/sh\n").unwrap();
}

fn manifest(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("tree.yml");
    fs::write(&path, text).unwrap();
    path
}

fn run_check(manifest: &Path, path: &Path, format: OutputFormat) -> (Status, String) {
    let args = CheckArgs {
        manifest: manifest.to_path_buf(),
        path: path.to_path_buf(),
        format,
    };
    let mut out = Vec::new();
    let status = check::run(&args, &mut out).unwrap();
    (status, String::from_utf8(out).unwrap())
}

#[test]
fn check_passes_on_matching_tree() {
    let tree = tempfile::tempdir().unwrap();
    let conf = tempfile::tempdir().unwrap();
    release(tree.path());
    let manifest = manifest(conf.path(), MANIFEST);

    let (status, out) = run_check(&manifest, tree.path(), OutputFormat::Text);
    assert_eq!(status, Status::Passed);
    assert!(out.ends_with("is as expected\n"), "{out}");
}

#[test]
fn check_prints_text_report_on_mismatch() {
    let tree = tempfile::tempdir().unwrap();
    let conf = tempfile::tempdir().unwrap();
    release(tree.path());
    fs::write(tree.path().join("debug.log"), "").unwrap();
    fs::write(tree.path().join("bin/run"), "").unwrap();
    let manifest = manifest(conf.path(), MANIFEST);

    let (status, out) = run_check(&manifest, tree.path(), OutputFormat::Text);
    assert_eq!(status, Status::Failed);
    let expected = format!(
        "{} was not as expected:
  - bin/run
      expected size to be > 0, but it was 0
  - debug.log
      expected file not to be found, but it exists
",
        tree.path().display()
    );
    assert_eq!(out, expected);
}

#[test]
fn check_json_report() {
    let tree = tempfile::tempdir().unwrap();
    let conf = tempfile::tempdir().unwrap();
    release(tree.path());
    fs::write(tree.path().join("extra"), "").unwrap();
    let manifest = manifest(conf.path(), MANIFEST);

    let (status, out) = run_check(&manifest, tree.path(), OutputFormat::Json);
    assert_eq!(status, Status::Failed);

    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["ok"], false);
    assert_eq!(report["failures"][0]["relative_path"], ".");
    assert_eq!(
        report["failures"][0]["message"],
        r#"expected no other entries, but found ["extra"]"#
    );
    assert_eq!(report["groups"].as_array().unwrap().len(), 1);
}

#[test]
fn check_rejects_invalid_specification() {
    let tree = tempfile::tempdir().unwrap();
    let manifest = manifest(tree.path(), "file: a\nsize: big\n");
    let args = CheckArgs {
        manifest,
        path: tree.path().to_path_buf(),
        format: OutputFormat::Text,
    };
    let err = check::run(&args, &mut Vec::<u8>::new()).unwrap_err();
    assert!(format!("{err:#}").contains("expected `size:` to be a Predicate or Integer"));
}

#[test]
fn describe_prints_tree() {
    let conf = tempfile::tempdir().unwrap();
    let args = DescribeArgs {
        manifest: manifest(conf.path(), "dir: app\nowner: dev\ncontaining:\n  - file: a\n"),
    };
    let mut out = Vec::new();
    describe::run(&args, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "have directory \"app\" with owner \"dev\" containing:\n  - have file \"a\"\n"
    );
}

#[test]
fn binary_exit_codes() {
    let tree = tempfile::tempdir().unwrap();
    let conf = tempfile::tempdir().unwrap();
    release(tree.path());
    let good = manifest(conf.path(), MANIFEST);

    let bin = env!("CARGO_BIN_EXE_pathspec");
    let status = Command::new(bin)
        .args(["check", "--manifest"])
        .arg(&good)
        .arg(tree.path())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(0));

    fs::remove_file(tree.path().join("VERSION")).unwrap();
    let status = Command::new(bin)
        .args(["check", "--manifest"])
        .arg(&good)
        .arg(tree.path())
        .output()
        .unwrap()
        .status;
    assert_eq!(status.code(), Some(1));

    let bad = conf.path().join("bad.yml");
    fs::write(&bad, "root: folder\n").unwrap();
    let output = Command::new(bin)
        .args(["check", "--manifest"])
        .arg(&bad)
        .arg(tree.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("`root:` must be"));
}
