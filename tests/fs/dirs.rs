//! Directory operations: create, list, remove, rename.

use objfs::FsError;

use crate::mount_fresh;

#[test]
fn readdir_lists_entries_in_name_order() {
    let (_store, fs) = mount_fresh();
    fs.create("/c", 0o644, 0, 0).unwrap();
    fs.create("/a", 0o644, 0, 0).unwrap();
    fs.mkdir("/b", 0o755, 0, 0).unwrap();

    let names: Vec<String> = fs
        .readdir("/")
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn nested_directories_resolve() {
    let (_store, fs) = mount_fresh();
    fs.mkdir("/d1", 0o755, 0, 0).unwrap();
    fs.mkdir("/d1/d2", 0o755, 0, 0).unwrap();
    fs.create("/d1/d2/f", 0o644, 0, 0).unwrap();

    // Redundant slashes are tolerated.
    assert!(fs.getattr("//d1///d2/f/").is_ok());
    assert_eq!(fs.readdir("/d1/d2").unwrap().len(), 1);
}

#[test]
fn create_in_missing_parent_fails() {
    let (_store, fs) = mount_fresh();
    assert!(matches!(
        fs.create("/no/file", 0o644, 0, 0),
        Err(FsError::NotFound)
    ));
}

#[test]
fn path_through_file_is_not_a_directory() {
    let (_store, fs) = mount_fresh();
    fs.create("/f", 0o644, 0, 0).unwrap();
    assert!(matches!(
        fs.create("/f/x", 0o644, 0, 0),
        Err(FsError::NotADirectory)
    ));
    assert!(matches!(fs.getattr("/f/x"), Err(FsError::NotADirectory)));
    assert!(matches!(fs.readdir("/f"), Err(FsError::NotADirectory)));
}

#[test]
fn duplicate_create_fails() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    assert!(matches!(
        fs.create("/a", 0o644, 0, 0),
        Err(FsError::AlreadyExists)
    ));
    assert!(matches!(
        fs.mkdir("/a", 0o755, 0, 0),
        Err(FsError::AlreadyExists)
    ));
}

#[test]
fn overlong_names_are_rejected() {
    let (_store, fs) = mount_fresh();
    let long = "x".repeat(256);
    assert!(matches!(
        fs.create(&format!("/{long}"), 0o644, 0, 0),
        Err(FsError::NameTooLong)
    ));
    let ok = "x".repeat(255);
    fs.create(&format!("/{ok}"), 0o644, 0, 0).unwrap();
}

#[test]
fn rmdir_requires_empty() {
    let (_store, fs) = mount_fresh();
    fs.mkdir("/d", 0o755, 0, 0).unwrap();
    fs.create("/d/f", 0o644, 0, 0).unwrap();

    assert!(matches!(fs.rmdir("/d"), Err(FsError::NotEmpty)));
    fs.unlink("/d/f").unwrap();
    fs.rmdir("/d").unwrap();
    assert!(matches!(fs.getattr("/d"), Err(FsError::NotFound)));
}

#[test]
fn unlink_refuses_directories() {
    let (_store, fs) = mount_fresh();
    fs.mkdir("/d", 0o755, 0, 0).unwrap();
    assert!(matches!(fs.unlink("/d"), Err(FsError::IsADirectory)));
    assert!(matches!(fs.rmdir("/missing"), Err(FsError::NotFound)));
}

#[test]
fn rename_moves_across_directories() {
    let (_store, fs) = mount_fresh();
    fs.mkdir("/d1", 0o755, 0, 0).unwrap();
    fs.mkdir("/d2", 0o755, 0, 0).unwrap();
    let created = fs.create("/d1/x", 0o644, 0, 0).unwrap();

    fs.rename("/d1/x", "/d2/y").unwrap();
    assert!(matches!(fs.getattr("/d1/x"), Err(FsError::NotFound)));
    assert_eq!(fs.getattr("/d2/y").unwrap().ino, created.ino);
}

#[test]
fn rename_target_must_not_exist() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    fs.create("/b", 0o644, 0, 0).unwrap();
    assert!(matches!(
        fs.rename("/a", "/b"),
        Err(FsError::AlreadyExists)
    ));
    assert!(matches!(fs.rename("/missing", "/c"), Err(FsError::NotFound)));
}

#[test]
fn unlink_reuses_nothing() {
    let (_store, fs) = mount_fresh();
    let first = fs.create("/a", 0o644, 0, 0).unwrap();
    fs.unlink("/a").unwrap();
    let second = fs.create("/a", 0o644, 0, 0).unwrap();
    // The allocator is monotone; numbers are never recycled within a mount.
    assert!(second.ino > first.ino);
}
