use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

fn parcmp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_parcmp"))
        .args(args)
        .env_remove("PARCMP_WORKER_THREADS")
        .output()
        .unwrap()
}

fn write(dir: &Path, name: &str, contents: &[u8]) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_owned()
}

#[test]
fn identical() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a", &[7; 10_000]);
    let b = write(dir.path(), "b", &[7; 10_000]);

    let out = parcmp(&["-q", "-j", "3", &a, &b]);
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("Result: SUCCESS"));
    assert!(stdout.contains("Blocks total: 3 (block size 4096)"));
}

#[test]
fn mismatch_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut right = vec![0; 100];
    right[55] = 1;
    let a = write(dir.path(), "a", &[0; 100]);
    let b = write(dir.path(), "b", &right);

    let out = parcmp(&["-q", "--json", "-j", "4", "-b", "10", &a, &b]);
    assert_eq!(out.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["outcome"], "MISMATCH");
    assert_eq!(report["mismatch_block"], 5);
    assert_eq!(report["mismatch_offset"], 55);
}

#[test]
fn size_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a", &[0; 10_000]);
    let b = write(dir.path(), "b", &[0; 9_999]);

    let out = parcmp(&["-q", &a, &b]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stdout).contains("file sizes differ"));
}

#[test]
fn usage_errors() {
    assert_eq!(parcmp(&["only-one-file"]).status.code(), Some(2));
    assert_eq!(parcmp(&["-j", "0", "a", "b"]).status.code(), Some(2));
    assert_eq!(parcmp(&["-b", "0", "a", "b"]).status.code(), Some(2));
}

#[test]
fn missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a", b"data");
    let missing = dir.path().join("missing");

    let out = parcmp(&["-q", &a, missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn report_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a", b"same");
    let report = dir.path().join("report.json");

    let out = parcmp(&["-q", "--json", "-o", report.to_str().unwrap(), &a, &a]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());

    let report: serde_json::Value = serde_json::from_slice(&fs::read(report).unwrap()).unwrap();
    assert_eq!(report["outcome"], "SUCCESS");
    assert_eq!(report["total_blocks"], 1);
}

#[test]
fn unwritable_report() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a", b"same");
    let report = dir.path().join("no_such_dir").join("report.txt");

    let out = parcmp(&["-q", "-j", "1", "-o", report.to_str().unwrap(), &a, &a]);
    assert_eq!(out.status.code(), Some(3));
}

#[cfg(unix)]
#[test]
fn unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "entry", b"keeps the directory non-empty");
    let path = dir.path().to_str().unwrap();

    let out = parcmp(&["-q", "-j", "2", path, path]);
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("Result: ERROR"));
}
