use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

const CSV_HEADER: &str = "amount,currency,receipt,method,vpa,card_number,expiry_month,expiry_year";

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "{CSV_HEADER}").unwrap();
    writeln!(csv, "500,INR,,upi,bob@upi,,,").unwrap();

    let mut cmd = Command::new(cargo_bin!("paysim"));
    cmd.arg(csv.path())
        .arg("--db-path")
        .arg("some_db")
        .arg("--test-mode")
        .env("TEST_PROCESSING_DELAY", "10");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "{CSV_HEADER}").unwrap();
    writeln!(csv, "500,INR,,upi,bob@upi,,,").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("paysim"));
    cmd.arg(csv.path())
        .arg("--db-path")
        .arg(&db_path)
        .arg("--test-mode")
        .env("TEST_PROCESSING_DELAY", "10");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}
