//! Mount-time replay: reconstructing in-memory state from the object log.
//!
//! Objects are applied in index order; within an object, records apply
//! left to right. Any precondition violation aborts the mount with a
//! bad-format error for that object.

use tracing::debug;

use crate::error::{FsError, Result};
use crate::extent::Extent;
use crate::fs::{object_key, Volume};
use crate::inode::{Inode, NodeKind};
use crate::record::{ObjectHeader, Record, OBJ_DATA, OBJ_HEADER_LEN};
use crate::TRACING_TARGET;

/// Fetch, validate, and apply the data object with index `idx`.
///
/// Also primes the data-offset cache with the object's header length,
/// saving the read path a header round-trip later.
pub(crate) fn replay_object(vol: &mut Volume, idx: u32) -> Result<()> {
    let key = object_key(&vol.prefix, idx);

    let mut header_buf = [0u8; OBJ_HEADER_LEN];
    let n = vol.store.get(&key, 0, &mut header_buf)?;
    if n < OBJ_HEADER_LEN {
        return Err(FsError::BadFormat("short object header"));
    }
    let header = ObjectHeader::decode(&header_buf)?;
    if header.kind != OBJ_DATA {
        return Err(FsError::BadFormat("not a data object"));
    }

    let meta_len = header.hdr_len as usize - OBJ_HEADER_LEN;
    let mut meta = vec![0u8; meta_len];
    if meta_len > 0 {
        let n = vol.store.get(&key, OBJ_HEADER_LEN as u64, &mut meta)?;
        if n < meta_len {
            return Err(FsError::BadFormat("short metadata region"));
        }
    }
    vol.data_offsets.insert(idx, header.hdr_len);

    debug!(target: TRACING_TARGET, key = %key, meta_bytes = meta_len, "replaying object");
    let mut rest: &[u8] = &meta;
    while !rest.is_empty() {
        let rec = Record::decode(&mut rest)?;
        apply(vol, idx, rec)?;
    }
    Ok(())
}

fn entry_name(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|_| FsError::BadFormat("entry name is not utf-8"))
}

fn apply(vol: &mut Volume, idx: u32, rec: Record) -> Result<()> {
    match rec {
        Record::Inode {
            ino,
            mode,
            uid,
            gid,
            rdev,
            mtime,
        } => match vol.table.get_mut(ino) {
            Some(node) => {
                node.mode = mode;
                node.uid = uid;
                node.gid = gid;
                node.rdev = rdev;
                node.mtime = mtime;
            }
            None => {
                let mut node = Inode::new(ino, mode, uid, gid, rdev);
                node.mtime = mtime;
                vol.table.insert(node);
            }
        },

        Record::Data {
            ino,
            obj_offset,
            file_offset,
            size,
            len,
        } => {
            let node = vol
                .table
                .get_mut(ino)
                .ok_or(FsError::BadFormat("data record for unknown inode"))?;
            let extents = node
                .extents_mut()
                .ok_or(FsError::BadFormat("data record for non-file"))?;
            extents.update(
                file_offset,
                Extent {
                    obj: idx,
                    offset: obj_offset,
                    len,
                },
            );
            node.size = size;
        }

        Record::Trunc { ino, new_size } => {
            let node = vol
                .table
                .get_mut(ino)
                .ok_or(FsError::BadFormat("truncate of unknown inode"))?;
            if node.extents().is_none() {
                return Err(FsError::BadFormat("truncate of non-file"));
            }
            if new_size > node.size {
                return Err(FsError::BadFormat("truncate extends file"));
            }
            node.extents_mut().unwrap().truncate(new_size);
            node.size = new_size;
        }

        Record::Create { parent, ino, name } => {
            let name = entry_name(name)?;
            let node = vol
                .table
                .get_mut(parent)
                .ok_or(FsError::BadFormat("create in unknown directory"))?;
            let entries = node
                .entries_mut()
                .ok_or(FsError::BadFormat("create in non-directory"))?;
            entries.insert(name, ino);
            vol.table.observe(ino);
        }

        Record::Delete { parent, ino, name } => {
            let name = entry_name(name)?;
            if !vol.table.contains(ino) {
                return Err(FsError::BadFormat("delete of unknown inode"));
            }
            let node = vol
                .table
                .get_mut(parent)
                .ok_or(FsError::BadFormat("delete in unknown directory"))?;
            let entries = node
                .entries_mut()
                .ok_or(FsError::BadFormat("delete in non-directory"))?;
            entries.remove(&name);
            vol.table.remove(ino);
        }

        Record::Symlink { ino, target } => {
            let node = vol
                .table
                .get_mut(ino)
                .ok_or(FsError::BadFormat("symlink record for unknown inode"))?;
            match &mut node.kind {
                NodeKind::Symlink { target: t } => *t = target,
                _ => return Err(FsError::BadFormat("symlink record for non-symlink")),
            }
        }

        Record::Rename {
            ino,
            parent1,
            parent2,
            name1,
            name2,
        } => {
            let name1 = entry_name(name1)?;
            let name2 = entry_name(name2)?;
            {
                let src = vol
                    .table
                    .get(parent1)
                    .ok_or(FsError::BadFormat("rename from unknown directory"))?;
                let entries = src
                    .entries()
                    .ok_or(FsError::BadFormat("rename from non-directory"))?;
                if entries.get(&name1) != Some(&ino) {
                    return Err(FsError::BadFormat("rename source mismatch"));
                }
                let dst = vol
                    .table
                    .get(parent2)
                    .ok_or(FsError::BadFormat("rename into unknown directory"))?;
                let entries = dst
                    .entries()
                    .ok_or(FsError::BadFormat("rename into non-directory"))?;
                if entries.contains_key(&name2) {
                    return Err(FsError::BadFormat("rename destination occupied"));
                }
            }
            let src = vol.table.get_mut(parent1).unwrap();
            src.entries_mut().unwrap().remove(&name1);
            let dst = vol.table.get_mut(parent2).unwrap();
            dst.entries_mut().unwrap().insert(name2, ino);
        }

        Record::Null => {}
    }
    Ok(())
}
