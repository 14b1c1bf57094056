//! Reads, writes, truncates, and the staging-buffer fast path.

use objfs::FsError;

use crate::mount_fresh;

#[test]
fn write_then_read_back() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 1000, 1000).unwrap();
    assert_eq!(fs.write("/a", 0, b"hello").unwrap(), 5);

    let mut buf = [0u8; 5];
    assert_eq!(fs.read("/a", 0, &mut buf).unwrap(), 5);
    assert_eq!(&buf, b"hello");
    assert_eq!(fs.getattr("/a").unwrap().size, 5);
}

#[test]
fn unflushed_reads_never_touch_the_store() {
    let (store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    fs.write("/a", 0, b"xyz").unwrap();

    let gets_before = store.get_count();
    let mut buf = [0u8; 3];
    assert_eq!(fs.read("/a", 0, &mut buf).unwrap(), 3);
    assert_eq!(&buf, b"xyz");
    // Served from the staging data buffer; no GET was issued.
    assert_eq!(store.get_count(), gets_before);
}

#[test]
fn overwrite_reads_spliced_content() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    fs.write("/a", 0, b"AAAAAAAA").unwrap();
    fs.write("/a", 3, b"bb").unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(fs.read("/a", 0, &mut buf).unwrap(), 8);
    assert_eq!(&buf, b"AAAbbAAA");
}

#[test]
fn truncate_shrinks() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    fs.write("/a", 0, b"AAAAAAAA").unwrap();
    fs.write("/a", 3, b"bb").unwrap();
    fs.truncate("/a", 4).unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(fs.read("/a", 0, &mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], b"AAAb");
    assert_eq!(fs.getattr("/a").unwrap().size, 4);
}

#[test]
fn truncate_cannot_extend() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    fs.write("/a", 0, b"abc").unwrap();
    assert!(matches!(
        fs.truncate("/a", 100),
        Err(FsError::InvalidArgument)
    ));
}

#[test]
fn hole_reads_are_zero_filled() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    fs.write("/a", 5, b"xyz").unwrap();
    assert_eq!(fs.getattr("/a").unwrap().size, 8);

    let mut buf = [0xffu8; 8];
    assert_eq!(fs.read("/a", 0, &mut buf).unwrap(), 8);
    assert_eq!(&buf, b"\0\0\0\0\0xyz");
}

#[test]
fn read_beyond_coverage_is_short() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    fs.write("/a", 0, b"12345").unwrap();

    let mut buf = [0u8; 64];
    assert_eq!(fs.read("/a", 0, &mut buf).unwrap(), 5);
    assert_eq!(fs.read("/a", 5, &mut buf).unwrap(), 0);

    // Partial read inside the extent.
    let mut buf = [0u8; 2];
    assert_eq!(fs.read("/a", 2, &mut buf).unwrap(), 2);
    assert_eq!(&buf, b"34");
}

#[test]
fn zero_length_write_is_a_noop() {
    let (_store, fs) = mount_fresh();
    fs.create("/a", 0o644, 0, 0).unwrap();
    assert_eq!(fs.write("/a", 10, b"").unwrap(), 0);
    assert_eq!(fs.getattr("/a").unwrap().size, 0);
}

#[test]
fn io_against_wrong_types_fails() {
    let (_store, fs) = mount_fresh();
    fs.mkdir("/d", 0o755, 0, 0).unwrap();
    fs.create("/a", 0o644, 0, 0).unwrap();

    let mut buf = [0u8; 4];
    assert!(matches!(
        fs.read("/d", 0, &mut buf),
        Err(FsError::IsADirectory)
    ));
    assert!(matches!(
        fs.write("/d", 0, b"x"),
        Err(FsError::IsADirectory)
    ));
    assert!(matches!(fs.truncate("/d", 0), Err(FsError::IsADirectory)));
    assert!(matches!(fs.readlink("/a"), Err(FsError::InvalidArgument)));
    assert!(matches!(
        fs.read("/a", -1, &mut buf),
        Err(FsError::InvalidArgument)
    ));
}

#[test]
fn errno_mapping_matches_posix() {
    assert_eq!(FsError::NotFound.errno(), 2);
    assert_eq!(FsError::NotADirectory.errno(), 20);
    assert_eq!(FsError::IsADirectory.errno(), 21);
    assert_eq!(FsError::AlreadyExists.errno(), 17);
    assert_eq!(FsError::NotEmpty.errno(), 39);
    assert_eq!(FsError::InvalidArgument.errno(), 22);
    assert_eq!(FsError::BadFormat("x").errno(), 5);
}
