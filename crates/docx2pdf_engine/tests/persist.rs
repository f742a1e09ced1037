use std::fs;

use docx2pdf_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("pdfs").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
    // The writability probe leaves nothing behind.
    assert_eq!(fs::read_dir(&new_dir).unwrap().count(), 0);
}

#[test]
fn rejects_file_in_place_of_directory() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = ensure_output_dir(&file_path).unwrap_err();
    assert!(matches!(err, PersistError::OutputDir { .. }));
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path());

    let first = writer.write("config.ron", "(a: 1)").unwrap();
    assert_eq!(first.file_name().unwrap(), "config.ron");
    assert_eq!(fs::read_to_string(&first).unwrap(), "(a: 1)");

    let second = writer.write("config.ron", "(a: 2)").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "(a: 2)");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("config.ron", "data").is_err());
    assert!(!file_path.with_file_name("config.ron").exists());
}
