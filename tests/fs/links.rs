//! Symlink creation and readback.

use objfs::FsError;

use crate::{mount_fresh, remount};

#[test]
fn symlink_round_trip() {
    let (_store, fs) = mount_fresh();
    fs.mkdir("/d", 0o755, 0, 0).unwrap();
    fs.symlink("/d/link", "../target/file", 0, 0).unwrap();

    assert_eq!(fs.readlink("/d/link").unwrap(), b"../target/file");
    let attr = fs.getattr("/d/link").unwrap();
    assert_eq!(attr.mode, 0o120777);
}

#[test]
fn symlink_survives_remount() {
    let (store, fs) = mount_fresh();
    fs.symlink("/l", "/somewhere/else", 0, 0).unwrap();
    fs.fsync().unwrap();
    drop(fs);

    let fs = remount(&store);
    assert_eq!(fs.readlink("/l").unwrap(), b"/somewhere/else");
}

#[test]
fn unlink_removes_symlink() {
    let (_store, fs) = mount_fresh();
    fs.symlink("/l", "t", 0, 0).unwrap();
    fs.unlink("/l").unwrap();
    assert!(matches!(fs.readlink("/l"), Err(FsError::NotFound)));
}

#[test]
fn readlink_on_directory_fails() {
    let (_store, fs) = mount_fresh();
    fs.mkdir("/d", 0o755, 0, 0).unwrap();
    assert!(matches!(fs.readlink("/d"), Err(FsError::InvalidArgument)));
}

#[test]
fn overlong_target_rejected() {
    let (_store, fs) = mount_fresh();
    let target = "t".repeat(256);
    assert!(matches!(
        fs.symlink("/l", &target, 0, 0),
        Err(FsError::NameTooLong)
    ));
}
