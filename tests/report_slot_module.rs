use quarto_assistant::report::{ReportError, SlotAllocator, DEFAULT_COLLISION_CEILING};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

#[test]
fn repeated_names_get_increasing_collision_suffixes() {
    let dir = tempdir().expect("tempdir");
    let allocator = SlotAllocator::new(dir.path());

    let first = allocator.allocate("mean-of-a-column.qmd").expect("first");
    let second = allocator.allocate("mean-of-a-column.qmd").expect("second");
    let third = allocator.allocate("Mean of a column").expect("third");

    assert_eq!(first.base_name, "mean-of-a-column");
    assert_eq!(first.collision_index, 0);
    assert_eq!(first.directory_path, dir.path().join("mean-of-a-column"));
    assert_eq!(second.collision_index, 1);
    assert_eq!(second.directory_path, dir.path().join("mean-of-a-column-1"));
    assert_eq!(third.directory_path, dir.path().join("mean-of-a-column-2"));
    assert!(third.directory_path.is_dir());
}

#[test]
fn missing_output_root_is_created() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("nested/output");
    let slot = SlotAllocator::new(&root).allocate("x").expect("allocate");
    assert_eq!(slot.directory_path, root.join("x"));
}

#[test]
fn ceiling_limits_attempts_and_reports_collisions() {
    let dir = tempdir().expect("tempdir");
    let allocator = SlotAllocator::new(dir.path());
    assert_eq!(allocator.ceiling(), DEFAULT_COLLISION_CEILING);

    for _ in 0..DEFAULT_COLLISION_CEILING {
        allocator.allocate("busy").expect("within ceiling");
    }
    let err = allocator.allocate("busy").expect_err("ceiling reached");
    match err {
        ReportError::TooManyCollisions {
            base_name,
            attempts,
            ..
        } => {
            assert_eq!(base_name, "busy");
            assert_eq!(attempts, DEFAULT_COLLISION_CEILING);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(dir.path().join("busy-99").is_dir());
    assert!(!dir.path().join("busy-100").exists());
}

#[test]
fn small_ceiling_is_honored_and_other_stems_are_unaffected() {
    let dir = tempdir().expect("tempdir");
    let allocator = SlotAllocator::with_ceiling(dir.path(), 2);
    allocator.allocate("a").expect("a");
    allocator.allocate("a").expect("a-1");
    assert!(allocator.allocate("a").is_err());
    assert_eq!(allocator.allocate("b").expect("b").collision_index, 0);
}

#[test]
fn pre_existing_directories_are_never_reused() {
    let dir = tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("taken")).expect("seed");
    std::fs::write(dir.path().join("taken/keep.txt"), "keep").expect("seed file");

    let slot = SlotAllocator::new(dir.path()).allocate("taken").expect("allocate");
    assert_eq!(slot.collision_index, 1);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("taken/keep.txt")).expect("read"),
        "keep"
    );
}

#[test]
fn concurrent_allocations_receive_distinct_directories() {
    let dir = tempdir().expect("tempdir");
    let allocator = Arc::new(SlotAllocator::new(dir.path()));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let allocator = Arc::clone(&allocator);
            thread::spawn(move || allocator.allocate("same-question").expect("allocate"))
        })
        .collect();

    let directories: BTreeSet<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("join").directory_path)
        .collect();
    assert_eq!(directories.len(), 16);
}
