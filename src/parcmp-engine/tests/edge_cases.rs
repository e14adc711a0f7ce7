use std::fs;

use parcmp_engine::{compare, BlockSource, CompareError, Config, Coordinator, SourceError, Verdict};

#[test]
fn empty_inputs_are_equal() -> Result<(), CompareError> {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"").unwrap();
    fs::write(&b, b"").unwrap();

    let report = compare(&a, &b, &Config::new(3, 4096)?)?;
    assert_eq!(report.outcome, Verdict::Success);
    assert_eq!(report.total_blocks, 0);
    assert_eq!(report.per_worker_blocks_processed.len(), 3);
    assert_eq!(report.blocks_processed(), 0);

    Ok(())
}

#[test]
fn more_workers_than_blocks() -> Result<(), CompareError> {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"tiny").unwrap();
    fs::write(&b, b"tiny").unwrap();

    let report = compare(&a, &b, &Config::new(32, 4096)?)?;
    assert_eq!(report.outcome, Verdict::Success);
    assert_eq!(report.total_blocks, 1);
    assert_eq!(report.blocks_processed(), 1);
    assert_eq!(report.per_worker_blocks_processed.len(), 32);

    Ok(())
}

#[test]
fn same_file_twice() -> Result<(), CompareError> {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    fs::write(&a, vec![0xAB; 70_000]).unwrap();

    let report = compare(&a, &a, &Config::new(4, 1024)?)?;
    assert!(report.is_equal());
    assert_eq!(report.blocks_processed(), 69);

    Ok(())
}

#[test]
fn missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    fs::write(&a, b"data").unwrap();

    let config = Config::new(2, 16).unwrap();
    let err = compare(&a, dir.path().join("missing"), &config).unwrap_err();
    assert!(matches!(err, CompareError::Source(SourceError::NotFound(_))));
}

#[test]
fn coordinator_over_open_sources() -> Result<(), CompareError> {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"0123456789abcdef").unwrap();
    fs::write(&b, b"0123456789abcdeF").unwrap();

    let coordinator = Coordinator::new(
        BlockSource::open(&a)?,
        BlockSource::open(&b)?,
        Config::new(2, 4)?,
    );
    let report = coordinator.run();

    assert_eq!(report.outcome, Verdict::Mismatch);
    assert_eq!(report.mismatch_block, Some(3));
    assert_eq!(report.mismatch_offset, Some(15));

    Ok(())
}

#[test]
fn huge_blocks_on_tiny_inputs() -> Result<(), CompareError> {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"abcd").unwrap();
    fs::write(&b, b"abcx").unwrap();

    let report = compare(&a, &b, &Config::new(64, u32::MAX)?)?;
    assert_eq!(report.outcome, Verdict::Mismatch);
    assert_eq!(report.total_blocks, 1);
    assert_eq!(report.mismatch_offset, Some(3));
    assert_eq!(report.per_worker_blocks_processed.len(), 64);

    Ok(())
}

// Directories open fine on Unix but every read fails.
#[cfg(unix)]
#[test]
fn read_failure_is_reported() -> Result<(), CompareError> {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("entry"), b"keeps the directory non-empty").unwrap();

    let report = compare(dir.path(), dir.path(), &Config::new(3, 1024)?)?;
    assert!(report.total_blocks > 0);
    assert_eq!(report.outcome, Verdict::IoError);
    assert_eq!(report.exit_code(), 3);
    assert_eq!(report.mismatch_block, None);
    assert!(report.io_error.as_ref().unwrap().contains("failed to read"));

    let ids: Vec<_> = report.per_worker_blocks_processed.keys().copied().collect();
    assert_eq!(ids, [0, 1, 2]);
    assert_eq!(report.blocks_processed(), 0);

    Ok(())
}
