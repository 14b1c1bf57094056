//! The mount-scoped filesystem: volume state, the POSIX operation surface,
//! the write path, and the extent-driven read engine.
//!
//! Every public operation acquires the volume mutex for its full duration,
//! so operations execute serially in host arrival order and all in-memory
//! structures are single-writer under that lock. The only suspension points
//! are object-store calls inside `flush`, sealed-object reads, and
//! mount-time replay.

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::BytesMut;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{FsError, Result};
use crate::extent::Extent;
use crate::inode::{Ino, Inode, InodeTable, NodeKind, TimeSpec, ROOT_INO, S_IFDIR, S_IFLNK, S_IFMT, S_IFREG};
use crate::path;
use crate::record::{ObjectHeader, Record, OBJ_DATA, OBJ_HEADER_LEN};
use crate::replay;
use crate::staging::Staging;
use crate::store::ObjectStore;
use crate::TRACING_TARGET;

/// Longest permitted entry name, in bytes. Also reported by `statfs`.
const NAME_MAX: usize = 255;

/// Block size reported by `getattr` and `statfs`.
const BLOCK_SIZE: i64 = 4096;

/// POSIX `stat`-shaped attributes of one filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAttr {
    pub ino: Ino,
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u32,
    pub size: i64,
    pub blocks: i64,
    pub atime: TimeSpec,
    pub mtime: TimeSpec,
    pub ctime: TimeSpec,
}

/// One directory entry as returned by [`Filesystem::readdir`].
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub attr: FileAttr,
}

/// Filesystem-level statistics. The object store is treated as unbounded,
/// so all block counts are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFs {
    pub block_size: u32,
    pub blocks: u64,
    pub blocks_free: u64,
    pub blocks_available: u64,
    pub name_max: u32,
}

/// How [`Filesystem::utimens`] should set the modification time.
#[derive(Debug, Clone, Copy)]
pub enum SetTime {
    /// Use the current wall-clock time (`UTIME_NOW`).
    Now,
    /// Leave the timestamp unchanged (`UTIME_OMIT`).
    Omit,
    /// Set an explicit timestamp.
    Time(TimeSpec),
}

pub(crate) fn object_key(prefix: &str, index: u32) -> String {
    format!("{prefix}.{index:08x}")
}

/// Parse the numeric index out of a data-object key. Keys that don't match
/// `"{prefix}.{hex8}"`, including the reserved `".ck"` checkpoint suffix,
/// yield `None`.
fn parse_object_index(prefix: &str, key: &str) -> Option<u32> {
    let rest = key.strip_prefix(prefix)?.strip_prefix('.')?;
    if rest.len() != 8 {
        return None;
    }
    u32::from_str_radix(rest, 16).ok()
}

/// All state of one mounted volume: the inode table, the staging buffers,
/// the object-id counter, and the read-side caches. Lives from mount until
/// the owning [`Filesystem`] is dropped.
pub(crate) struct Volume {
    pub(crate) table: InodeTable,
    pub(crate) staging: Staging,
    /// Index the in-flight staging object will receive when sealed.
    /// Extents written into staging carry this id, which is how the read
    /// path recognizes them.
    pub(crate) next_index: u32,
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) prefix: String,
    /// Memoized `hdr_len` per sealed object: where file data begins.
    pub(crate) data_offsets: IndexMap<u32, u32>,
}

impl Volume {
    /// Flush if either staging buffer has exceeded its cap.
    fn maybe_flush(&mut self) -> Result<()> {
        if self.staging.over_capacity() {
            self.flush()
        } else {
            Ok(())
        }
    }

    /// Seal the staging buffers into a new object and `PUT` it.
    ///
    /// Inode records for the dirty set are appended first, then the object
    /// is assembled as `[header, meta, data]`. On `PUT` failure the staging
    /// buffers are left intact: the mutations are still in memory and a
    /// later flush re-attempts the whole cut.
    fn flush(&mut self) -> Result<()> {
        for ino in self.staging.take_dirty() {
            // An inode can be dirtied and then destroyed before the flush.
            let rec = match self.table.get(ino) {
                Some(node) => Record::Inode {
                    ino: node.ino,
                    mode: node.mode,
                    uid: node.uid,
                    gid: node.gid,
                    rdev: node.rdev,
                    mtime: node.mtime,
                },
                None => continue,
            };
            self.staging.push_record(&rec);
        }

        let index = self.next_index;
        let key = object_key(&self.prefix, index);
        let header = ObjectHeader {
            kind: OBJ_DATA,
            hdr_len: (OBJ_HEADER_LEN + self.staging.meta_used()) as u32,
            index,
        };
        let mut header_buf = BytesMut::with_capacity(OBJ_HEADER_LEN);
        header.encode(&mut header_buf);

        debug!(
            target: TRACING_TARGET,
            key = %key,
            meta_bytes = self.staging.meta_used(),
            data_bytes = self.staging.data_used(),
            "sealing object"
        );
        let parts = [&header_buf[..], self.staging.meta(), self.staging.data()];
        self.store.put(&key, &parts)?;

        self.next_index += 1;
        self.staging.reset();
        Ok(())
    }

    /// Where file data begins within object `obj`, from the cache or a
    /// header read.
    fn object_data_offset(&mut self, obj: u32) -> Result<u32> {
        if let Some(&n) = self.data_offsets.get(&obj) {
            return Ok(n);
        }
        let key = object_key(&self.prefix, obj);
        let mut buf = [0u8; OBJ_HEADER_LEN];
        let n = self.store.get(&key, 0, &mut buf)?;
        if n < OBJ_HEADER_LEN {
            return Err(FsError::BadFormat("short object header"));
        }
        let header = ObjectHeader::decode(&buf)?;
        self.data_offsets.insert(obj, header.hdr_len);
        Ok(header.hdr_len)
    }

    /// Read `buf.len()` bytes of file data from object `obj` starting at
    /// `obj_offset` within its file-data region.
    ///
    /// Extents carrying the in-flight object id are served straight from
    /// the staging data buffer; everything else is a ranged `GET` against
    /// the sealed object.
    fn read_data(&mut self, obj: u32, obj_offset: u32, buf: &mut [u8]) -> Result<()> {
        if obj == self.next_index {
            let start = obj_offset as usize;
            let avail = self.staging.data_used().saturating_sub(start);
            let n = buf.len().min(avail);
            buf[..n].copy_from_slice(&self.staging.data()[start..start + n]);
            buf[n..].fill(0);
            return Ok(());
        }

        let hdr_len = self.object_data_offset(obj)?;
        let key = object_key(&self.prefix, obj);
        let n = self
            .store
            .get(&key, hdr_len as u64 + obj_offset as u64, buf)?;
        if n < buf.len() {
            return Err(FsError::BadFormat("extent past end of object"));
        }
        Ok(())
    }
}

fn attr_of(node: &Inode) -> FileAttr {
    FileAttr {
        ino: node.ino,
        mode: node.mode,
        nlink: 1,
        uid: node.uid,
        gid: node.gid,
        rdev: node.rdev,
        size: node.size,
        blocks: (node.size + BLOCK_SIZE - 1) / BLOCK_SIZE,
        atime: node.mtime,
        mtime: node.mtime,
        ctime: node.mtime,
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.len() > NAME_MAX {
        return Err(FsError::NameTooLong);
    }
    Ok(())
}

/// A mounted object-backed filesystem.
///
/// Constructed through [`crate::Builder::mount`], which lists and replays
/// every object under the key prefix. Dropping the value is teardown: all
/// in-memory state is released and nothing is flushed, so callers that
/// need unwritten state to survive must [`fsync`] first.
///
/// [`fsync`]: Filesystem::fsync
pub struct Filesystem {
    inner: Mutex<Volume>,
}

impl Filesystem {
    pub(crate) fn mount(config: Config, store: Arc<dyn ObjectStore>) -> Result<Filesystem> {
        let mut vol = Volume {
            table: InodeTable::new(),
            staging: Staging::new(config.meta_capacity, config.data_capacity),
            next_index: 0,
            store,
            prefix: config.prefix,
            data_offsets: IndexMap::new(),
        };

        // Seed the root directory before replay: the first object's records
        // reference inum 1 before any inode record for it appears (dirty-set
        // inode records land at the end of an object's metadata). A replayed
        // inode record for the root overwrites these defaults.
        vol.table.insert(Inode::new(ROOT_INO, S_IFDIR | 0o755, 0, 0, 0));

        let keys = vol.store.list(&vol.prefix)?;
        let mut indices = Vec::with_capacity(keys.len());
        for key in &keys {
            match parse_object_index(&vol.prefix, key) {
                Some(idx) => indices.push(idx),
                None => {
                    warn!(target: TRACING_TARGET, key = %key, "ignoring unrecognized key under prefix")
                }
            }
        }
        indices.sort_unstable();

        let fresh = indices.is_empty();
        for idx in indices {
            replay::replay_object(&mut vol, idx)?;
            vol.next_index = idx + 1;
        }
        if fresh {
            // Nothing durable yet: make sure the first flush records the root.
            vol.staging.mark_dirty(ROOT_INO);
        }

        info!(
            target: TRACING_TARGET,
            objects = keys.len(),
            inodes = vol.table.len(),
            next_index = vol.next_index,
            "mounted"
        );
        Ok(Filesystem {
            inner: Mutex::new(vol),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Volume> {
        self.inner.lock().unwrap()
    }

    /// Attributes of the object at `path`.
    pub fn getattr(&self, path: &str) -> Result<FileAttr> {
        let vol = self.lock();
        let ino = path::resolve(&vol.table, path)?;
        let node = vol.table.get(ino).ok_or(FsError::NotFound)?;
        Ok(attr_of(node))
    }

    /// All entries of the directory at `path`, in name order.
    pub fn readdir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let vol = self.lock();
        let ino = path::resolve(&vol.table, path)?;
        let node = vol.table.get(ino).ok_or(FsError::NotFound)?;
        let entries = node.entries().ok_or(FsError::NotADirectory)?;
        let mut out = Vec::with_capacity(entries.len());
        for (name, &child) in entries {
            let child = vol.table.get(child).ok_or(FsError::NotFound)?;
            out.push(DirEntry {
                name: name.clone(),
                attr: attr_of(child),
            });
        }
        Ok(out)
    }

    /// Create a regular file. `mode` is OR-ed with the regular-file bit.
    pub fn create(&self, path: &str, mode: u32, uid: u32, gid: u32) -> Result<FileAttr> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let ino = create_node(vol, path, mode | S_IFREG, 0, uid, gid)?;
        let attr = attr_of(vol.table.get(ino).unwrap());
        vol.maybe_flush()?;
        Ok(attr)
    }

    /// Create a directory.
    pub fn mkdir(&self, path: &str, mode: u32, uid: u32, gid: u32) -> Result<FileAttr> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let ino = create_node(vol, path, mode | S_IFDIR, 0, uid, gid)?;
        let attr = attr_of(vol.table.get(ino).unwrap());
        vol.maybe_flush()?;
        Ok(attr)
    }

    /// Create a device node, FIFO, or socket. `mode` carries the type bits.
    pub fn mknod(&self, path: &str, mode: u32, rdev: u32, uid: u32, gid: u32) -> Result<FileAttr> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let ino = create_node(vol, path, mode, rdev, uid, gid)?;
        let attr = attr_of(vol.table.get(ino).unwrap());
        vol.maybe_flush()?;
        Ok(attr)
    }

    /// Create a symbolic link at `path` pointing at `target`.
    ///
    /// Does not share `create_node`: the symlink record must land between
    /// the inode record and the dirent record.
    pub fn symlink(&self, path: &str, target: &str, uid: u32, gid: u32) -> Result<FileAttr> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        if target.len() > NAME_MAX {
            return Err(FsError::NameTooLong);
        }
        let (parent_ino, leaf) = path::resolve_parent(&vol.table, path)?;
        check_name(leaf)?;
        let parent = vol.table.get(parent_ino).ok_or(FsError::NotFound)?;
        let entries = parent.entries().ok_or(FsError::NotADirectory)?;
        if entries.contains_key(leaf) {
            return Err(FsError::AlreadyExists);
        }

        let ino = vol.table.allocate();
        let mut node = Inode::new(ino, S_IFLNK | 0o777, uid, gid, 0);
        if let NodeKind::Symlink { target: t } = &mut node.kind {
            *t = target.as_bytes().to_vec();
        }
        let inode_rec = Record::Inode {
            ino,
            mode: node.mode,
            uid,
            gid,
            rdev: 0,
            mtime: node.mtime,
        };
        vol.table.insert(node);

        let parent = vol.table.get_mut(parent_ino).unwrap();
        parent.entries_mut().unwrap().insert(leaf.to_string(), ino);
        parent.mtime = TimeSpec::now();

        vol.staging.push_record(&inode_rec);
        vol.staging.push_record(&Record::Symlink {
            ino,
            target: target.as_bytes().to_vec(),
        });
        vol.staging.push_record(&Record::Create {
            parent: parent_ino,
            ino,
            name: leaf.as_bytes().to_vec(),
        });
        vol.staging.mark_dirty(parent_ino);

        let attr = attr_of(vol.table.get(ino).unwrap());
        vol.maybe_flush()?;
        Ok(attr)
    }

    /// The target of the symlink at `path`.
    pub fn readlink(&self, path: &str) -> Result<Vec<u8>> {
        let vol = self.lock();
        let ino = path::resolve(&vol.table, path)?;
        let node = vol.table.get(ino).ok_or(FsError::NotFound)?;
        match &node.kind {
            NodeKind::Symlink { target } => Ok(target.clone()),
            _ => Err(FsError::InvalidArgument),
        }
    }

    /// Remove the non-directory at `path`. Regular files are truncated to
    /// zero first, and the inode is destroyed along with its entry.
    pub fn unlink(&self, path: &str) -> Result<()> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let (parent_ino, leaf) = path::resolve_parent(&vol.table, path)?;
        let parent = vol.table.get(parent_ino).ok_or(FsError::NotFound)?;
        let entries = parent.entries().ok_or(FsError::NotADirectory)?;
        let ino = *entries.get(leaf).ok_or(FsError::NotFound)?;
        let node = vol.table.get(ino).ok_or(FsError::NotFound)?;
        if node.is_dir() {
            return Err(FsError::IsADirectory);
        }

        if node.extents().is_some() {
            let node = vol.table.get_mut(ino).unwrap();
            node.extents_mut().unwrap().truncate(0);
            node.size = 0;
            vol.staging.push_record(&Record::Trunc { ino, new_size: 0 });
        }

        let parent = vol.table.get_mut(parent_ino).unwrap();
        parent.entries_mut().unwrap().remove(leaf);
        parent.mtime = TimeSpec::now();
        vol.staging.push_record(&Record::Delete {
            parent: parent_ino,
            ino,
            name: leaf.as_bytes().to_vec(),
        });
        vol.staging.mark_dirty(parent_ino);
        vol.staging.forget_dirty(ino);
        vol.table.remove(ino);
        vol.maybe_flush()
    }

    /// Remove the empty directory at `path`.
    pub fn rmdir(&self, path: &str) -> Result<()> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let (parent_ino, leaf) = path::resolve_parent(&vol.table, path)?;
        let parent = vol.table.get(parent_ino).ok_or(FsError::NotFound)?;
        let entries = parent.entries().ok_or(FsError::NotADirectory)?;
        let ino = *entries.get(leaf).ok_or(FsError::NotFound)?;
        let node = vol.table.get(ino).ok_or(FsError::NotFound)?;
        let children = node.entries().ok_or(FsError::NotADirectory)?;
        if !children.is_empty() {
            return Err(FsError::NotEmpty);
        }

        let parent = vol.table.get_mut(parent_ino).unwrap();
        parent.entries_mut().unwrap().remove(leaf);
        parent.mtime = TimeSpec::now();
        vol.staging.push_record(&Record::Delete {
            parent: parent_ino,
            ino,
            name: leaf.as_bytes().to_vec(),
        });
        vol.staging.mark_dirty(parent_ino);
        vol.staging.forget_dirty(ino);
        vol.table.remove(ino);
        vol.maybe_flush()
    }

    /// Move the entry at `src` to `dst`, which must not exist.
    pub fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let (src_parent, src_leaf) = path::resolve_parent(&vol.table, src)?;
        let parent = vol.table.get(src_parent).ok_or(FsError::NotFound)?;
        let entries = parent.entries().ok_or(FsError::NotADirectory)?;
        let ino = *entries.get(src_leaf).ok_or(FsError::NotFound)?;

        let (dst_parent, dst_leaf) = path::resolve_parent(&vol.table, dst)?;
        check_name(dst_leaf)?;
        let parent = vol.table.get(dst_parent).ok_or(FsError::NotFound)?;
        let entries = parent.entries().ok_or(FsError::NotADirectory)?;
        if entries.contains_key(dst_leaf) {
            return Err(FsError::AlreadyExists);
        }

        let now = TimeSpec::now();
        let parent = vol.table.get_mut(src_parent).unwrap();
        parent.entries_mut().unwrap().remove(src_leaf);
        parent.mtime = now;
        let parent = vol.table.get_mut(dst_parent).unwrap();
        parent
            .entries_mut()
            .unwrap()
            .insert(dst_leaf.to_string(), ino);
        parent.mtime = now;

        vol.staging.push_record(&Record::Rename {
            ino,
            parent1: src_parent,
            parent2: dst_parent,
            name1: src_leaf.as_bytes().to_vec(),
            name2: dst_leaf.as_bytes().to_vec(),
        });
        vol.staging.mark_dirty(src_parent);
        vol.staging.mark_dirty(dst_parent);
        vol.maybe_flush()
    }

    /// Replace the permission bits of `path`, preserving the type bits.
    pub fn chmod(&self, path: &str, mode: u32) -> Result<()> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let ino = path::resolve(&vol.table, path)?;
        let node = vol.table.get_mut(ino).ok_or(FsError::NotFound)?;
        node.mode = (mode & !S_IFMT) | (node.mode & S_IFMT);
        vol.staging.mark_dirty(ino);
        vol.maybe_flush()
    }

    /// Set the modification time of `path`.
    pub fn utimens(&self, path: &str, mtime: SetTime) -> Result<()> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let ino = path::resolve(&vol.table, path)?;
        let node = vol.table.get_mut(ino).ok_or(FsError::NotFound)?;
        match mtime {
            SetTime::Now => node.mtime = TimeSpec::now(),
            SetTime::Time(t) => node.mtime = t,
            SetTime::Omit => {}
        }
        vol.staging.mark_dirty(ino);
        vol.maybe_flush()
    }

    /// Shrink the regular file at `path` to `new_size` bytes.
    ///
    /// Growing a file this way is rejected: a truncate record may only
    /// shrink, so an extending truncate could never replay.
    pub fn truncate(&self, path: &str, new_size: i64) -> Result<()> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        let ino = path::resolve(&vol.table, path)?;
        let node = vol.table.get_mut(ino).ok_or(FsError::NotFound)?;
        if node.is_dir() {
            return Err(FsError::IsADirectory);
        }
        if node.extents().is_none() {
            return Err(FsError::InvalidArgument);
        }
        if new_size < 0 || new_size > node.size {
            return Err(FsError::InvalidArgument);
        }
        node.extents_mut().unwrap().truncate(new_size);
        node.size = new_size;
        node.mtime = TimeSpec::now();
        vol.staging.push_record(&Record::Trunc { ino, new_size });
        vol.staging.mark_dirty(ino);
        vol.maybe_flush()
    }

    /// Read from the regular file at `path` starting at `offset`.
    ///
    /// Returns how many bytes were placed in `buf`: holes between extents
    /// are zero-filled, and the count stops at the last byte actually
    /// backed by an extent.
    pub fn read(&self, path: &str, offset: i64, buf: &mut [u8]) -> Result<usize> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        if offset < 0 {
            return Err(FsError::InvalidArgument);
        }
        let ino = path::resolve(&vol.table, path)?;
        let node = vol.table.get(ino).ok_or(FsError::NotFound)?;
        let extents: Vec<(i64, Extent)> = match &node.kind {
            NodeKind::File { extents } => extents.from_offset(offset).collect(),
            NodeKind::Dir { .. } => return Err(FsError::IsADirectory),
            _ => return Err(FsError::InvalidArgument),
        };

        let len = buf.len();
        let mut bytes = 0;
        let mut offset = offset;
        for (base, e) in extents {
            if bytes >= len {
                break;
            }
            if base > offset {
                // A hole: reads across it return zeroes.
                let fill = ((base - offset) as usize).min(len - bytes);
                buf[bytes..bytes + fill].fill(0);
                bytes += fill;
                offset += fill as i64;
                if bytes >= len {
                    break;
                }
            }
            let skip = (offset - base) as u32;
            let take = ((e.len - skip) as usize).min(len - bytes);
            vol.read_data(e.obj, e.offset + skip, &mut buf[bytes..bytes + take])?;
            bytes += take;
            offset += take as i64;
        }
        Ok(bytes)
    }

    /// Write `data` to the regular file at `path` at `offset`.
    ///
    /// The payload lands in the staging data buffer and a data record in
    /// the meta buffer; durability follows at the next flush. A
    /// zero-length write is a no-op and emits no record.
    pub fn write(&self, path: &str, offset: i64, data: &[u8]) -> Result<usize> {
        let mut guard = self.lock();
        let vol = &mut *guard;
        if offset < 0 {
            return Err(FsError::InvalidArgument);
        }
        let ino = path::resolve(&vol.table, path)?;
        let node = vol.table.get_mut(ino).ok_or(FsError::NotFound)?;
        if node.is_dir() {
            return Err(FsError::IsADirectory);
        }
        if node.extents().is_none() {
            return Err(FsError::InvalidArgument);
        }
        if data.is_empty() {
            return Ok(0);
        }

        let len = data.len() as u32;
        let new_size = node.size.max(offset + data.len() as i64);
        let obj_offset = vol.staging.push_data(data);
        vol.staging.push_record(&Record::Data {
            ino,
            obj_offset,
            file_offset: offset,
            size: new_size,
            len,
        });
        node.extents_mut().unwrap().update(
            offset,
            Extent {
                obj: vol.next_index,
                offset: obj_offset,
                len,
            },
        );
        node.size = new_size;
        vol.staging.mark_dirty(ino);
        vol.maybe_flush()?;
        Ok(data.len())
    }

    /// Seal and store the staging buffers regardless of fill level.
    pub fn fsync(&self) -> Result<()> {
        self.lock().flush()
    }

    /// Filesystem statistics.
    pub fn statfs(&self) -> StatFs {
        StatFs {
            block_size: BLOCK_SIZE as u32,
            blocks: 0,
            blocks_free: 0,
            blocks_available: 0,
            name_max: NAME_MAX as u32,
        }
    }
}

/// Shared creation path for files, directories, and device nodes:
/// allocate, install, link into the parent, and log the inode and dirent
/// records.
fn create_node(vol: &mut Volume, path: &str, mode: u32, rdev: u32, uid: u32, gid: u32) -> Result<Ino> {
    let (parent_ino, leaf) = path::resolve_parent(&vol.table, path)?;
    check_name(leaf)?;
    let parent = vol.table.get(parent_ino).ok_or(FsError::NotFound)?;
    let entries = parent.entries().ok_or(FsError::NotADirectory)?;
    if entries.contains_key(leaf) {
        return Err(FsError::AlreadyExists);
    }

    let ino = vol.table.allocate();
    let node = Inode::new(ino, mode, uid, gid, rdev);
    let inode_rec = Record::Inode {
        ino,
        mode,
        uid,
        gid,
        rdev,
        mtime: node.mtime,
    };
    vol.table.insert(node);

    let parent = vol.table.get_mut(parent_ino).unwrap();
    parent.entries_mut().unwrap().insert(leaf.to_string(), ino);
    parent.mtime = TimeSpec::now();

    // The new inode's record can't wait for the dirty set: records that
    // reference the inode may precede the flush tail.
    vol.staging.push_record(&inode_rec);
    vol.staging.push_record(&Record::Create {
        parent: parent_ino,
        ino,
        name: leaf.as_bytes().to_vec(),
    });
    vol.staging.mark_dirty(parent_ino);
    Ok(ino)
}
