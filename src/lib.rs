//! Core of an object-backed log-structured filesystem.
//!
//! The entire durable state of the filesystem is a sequence of append-only
//! *data objects* in an object store. Each object is self-describing: a
//! fixed header, a run of log records describing metadata mutations, and a
//! blob of file-data bytes those records reference. Replaying the objects
//! in creation order fully reconstructs the in-memory state: inodes,
//! directories, symlinks, and per-file extent maps.
//!
//! Mutations accumulate in two staging buffers (log records and file data)
//! that are sealed into a new object once either exceeds its cap, or on
//! [`fsync`]. Reads walk the file's extent map, mixing the in-flight
//! staging buffer with ranged reads against previously sealed objects.
//!
//! The store itself is a capability: anything implementing
//! [`store::ObjectStore`], whether an S3 bucket, a local directory
//! ([`store::DirStore`]), or memory ([`store::MemoryStore`]), can back a
//! volume. Binding the POSIX surface to a kernel (e.g. via FUSE) is left
//! to a thin layer on top of [`Filesystem`].
//!
//! ```
//! use std::sync::Arc;
//! use objfs::{Builder, store::MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//!
//! let fs = Builder::new().prefix("vol0").mount(store.clone()).unwrap();
//! fs.create("/hello.txt", 0o644, 0, 0).unwrap();
//! fs.write("/hello.txt", 0, b"hello world").unwrap();
//! fs.fsync().unwrap();
//! drop(fs);
//!
//! // A remount replays the objects and sees the same state.
//! let fs = Builder::new().prefix("vol0").mount(store).unwrap();
//! let mut buf = [0u8; 11];
//! assert_eq!(fs.read("/hello.txt", 0, &mut buf).unwrap(), 11);
//! assert_eq!(&buf, b"hello world");
//! ```
//!
//! [`fsync`]: Filesystem::fsync

mod builder;
pub use builder::Builder;

mod config;

mod error;
pub use error::{FsError, Result};

mod extent;

mod fs;
pub use fs::{DirEntry, FileAttr, Filesystem, SetTime, StatFs};

mod inode;
pub use inode::{Ino, TimeSpec, ROOT_INO};

mod path;
mod record;
mod replay;
mod staging;

pub mod store;

pub(crate) const TRACING_TARGET: &str = "objfs";
