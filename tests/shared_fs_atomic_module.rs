use quarto_assistant::shared::fs_atomic::{create_dir_exclusive, write_new_file, ExclusiveCreate};
use std::fs;
use tempfile::tempdir;

#[test]
fn exclusive_directory_creation_reports_existing_directories() {
    let dir = tempdir().expect("tempdir");
    let target = dir.path().join("slot");
    assert_eq!(
        create_dir_exclusive(&target).expect("create"),
        ExclusiveCreate::Created
    );
    assert_eq!(
        create_dir_exclusive(&target).expect("second create"),
        ExclusiveCreate::AlreadyExists
    );
}

#[test]
fn exclusive_directory_creation_needs_an_existing_parent() {
    let dir = tempdir().expect("tempdir");
    let err = create_dir_exclusive(&dir.path().join("missing/child")).expect_err("no parent");
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn new_files_are_written_once() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("doc.qmd");
    write_new_file(&path, b"first").expect("write");
    let err = write_new_file(&path, b"second").expect_err("exists");
    assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
    assert_eq!(fs::read(&path).expect("read"), b"first");
}
