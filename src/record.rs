//! Bit-exact codec for object headers and log records.
//!
//! Every record is a 2-byte little-endian header (`type` in the low 4 bits,
//! payload `len` in the high 12) followed by `len` bytes of fixed-width
//! little-endian payload with no alignment padding. Records are packed back
//! to back in the metadata region of an object.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FsError, Result};
use crate::inode::TimeSpec;

/// `"OBFS"` interpreted little-endian.
pub(crate) const OBJFS_MAGIC: u32 = 0x5346_424F;
pub(crate) const FORMAT_VERSION: u32 = 1;

/// Object kind: the logical log.
pub(crate) const OBJ_DATA: u32 = 1;
/// Object kind: read-optimized metadata checkpoint. Reserved; never
/// written and skipped at mount.
#[allow(dead_code)]
pub(crate) const OBJ_CHECKPOINT: u32 = 2;

/// Serialized object header size in bytes.
pub(crate) const OBJ_HEADER_LEN: usize = 20;

const REC_INODE: u16 = 1;
const REC_TRUNC: u16 = 2;
const REC_DELETE: u16 = 3;
const REC_SYMLNK: u16 = 4;
const REC_RENAME: u16 = 5;
const REC_DATA: u16 = 6;
const REC_CREATE: u16 = 7;
const REC_NULL: u16 = 8;

/// Fixed header at the front of every stored object. File data occupies
/// `[hdr_len, object_length)`; log records occupy `[OBJ_HEADER_LEN, hdr_len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ObjectHeader {
    pub kind: u32,
    pub hdr_len: u32,
    pub index: u32,
}

impl ObjectHeader {
    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32_le(OBJFS_MAGIC);
        buf.put_u32_le(FORMAT_VERSION);
        buf.put_u32_le(self.kind);
        buf.put_u32_le(self.hdr_len);
        buf.put_u32_le(self.index);
    }

    pub(crate) fn decode(mut buf: &[u8]) -> Result<ObjectHeader> {
        if buf.len() < OBJ_HEADER_LEN {
            return Err(FsError::BadFormat("short object header"));
        }
        if buf.get_u32_le() != OBJFS_MAGIC {
            return Err(FsError::BadFormat("bad magic"));
        }
        if buf.get_u32_le() != FORMAT_VERSION {
            return Err(FsError::BadFormat("unsupported version"));
        }
        let kind = buf.get_u32_le();
        let hdr_len = buf.get_u32_le();
        let index = buf.get_u32_le();
        if (hdr_len as usize) < OBJ_HEADER_LEN {
            return Err(FsError::BadFormat("header length below minimum"));
        }
        Ok(ObjectHeader {
            kind,
            hdr_len,
            index,
        })
    }
}

/// One decoded metadata mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Record {
    Inode {
        ino: u32,
        mode: u32,
        uid: u32,
        gid: u32,
        rdev: u32,
        mtime: TimeSpec,
    },
    Trunc {
        ino: u32,
        new_size: i64,
    },
    Delete {
        parent: u32,
        ino: u32,
        name: Vec<u8>,
    },
    Symlink {
        ino: u32,
        target: Vec<u8>,
    },
    Rename {
        ino: u32,
        parent1: u32,
        parent2: u32,
        name1: Vec<u8>,
        name2: Vec<u8>,
    },
    Data {
        ino: u32,
        obj_offset: u32,
        file_offset: i64,
        size: i64,
        len: u32,
    },
    Create {
        parent: u32,
        ino: u32,
        name: Vec<u8>,
    },
    Null,
}

impl Record {
    fn tag(&self) -> u16 {
        match self {
            Record::Inode { .. } => REC_INODE,
            Record::Trunc { .. } => REC_TRUNC,
            Record::Delete { .. } => REC_DELETE,
            Record::Symlink { .. } => REC_SYMLNK,
            Record::Rename { .. } => REC_RENAME,
            Record::Data { .. } => REC_DATA,
            Record::Create { .. } => REC_CREATE,
            Record::Null => REC_NULL,
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            Record::Inode { .. } => 32,
            Record::Trunc { .. } => 12,
            Record::Delete { name, .. } => 9 + name.len(),
            Record::Symlink { target, .. } => 5 + target.len(),
            Record::Rename { name1, name2, .. } => 14 + name1.len() + name2.len(),
            Record::Data { .. } => 28,
            Record::Create { name, .. } => 9 + name.len(),
            Record::Null => 0,
        }
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        let len = self.payload_len();
        debug_assert!(len < 1 << 12, "record payload exceeds 12-bit length");
        buf.put_u16_le((len as u16) << 4 | self.tag());
        match self {
            Record::Inode {
                ino,
                mode,
                uid,
                gid,
                rdev,
                mtime,
            } => {
                buf.put_u32_le(*ino);
                buf.put_u32_le(*mode);
                buf.put_u32_le(*uid);
                buf.put_u32_le(*gid);
                buf.put_u32_le(*rdev);
                buf.put_i64_le(mtime.sec);
                buf.put_i32_le(mtime.nsec);
            }
            Record::Trunc { ino, new_size } => {
                buf.put_u32_le(*ino);
                buf.put_i64_le(*new_size);
            }
            Record::Delete { parent, ino, name } => {
                buf.put_u32_le(*parent);
                buf.put_u32_le(*ino);
                buf.put_u8(name.len() as u8);
                buf.put_slice(name);
            }
            Record::Symlink { ino, target } => {
                buf.put_u32_le(*ino);
                buf.put_u8(target.len() as u8);
                buf.put_slice(target);
            }
            Record::Rename {
                ino,
                parent1,
                parent2,
                name1,
                name2,
            } => {
                buf.put_u32_le(*ino);
                buf.put_u32_le(*parent1);
                buf.put_u32_le(*parent2);
                buf.put_u8(name1.len() as u8);
                buf.put_u8(name2.len() as u8);
                buf.put_slice(name1);
                buf.put_slice(name2);
            }
            Record::Data {
                ino,
                obj_offset,
                file_offset,
                size,
                len,
            } => {
                buf.put_u32_le(*ino);
                buf.put_u32_le(*obj_offset);
                buf.put_i64_le(*file_offset);
                buf.put_i64_le(*size);
                buf.put_u32_le(*len);
            }
            Record::Create { parent, ino, name } => {
                buf.put_u32_le(*parent);
                buf.put_u32_le(*ino);
                buf.put_u8(name.len() as u8);
                buf.put_slice(name);
            }
            Record::Null => {}
        }
    }

    /// Decode one record from the front of `buf`, advancing it past the
    /// record. Fails if the stated payload length overruns `buf` or is
    /// inconsistent with the record type.
    pub(crate) fn decode(buf: &mut &[u8]) -> Result<Record> {
        if buf.len() < 2 {
            return Err(FsError::BadFormat("truncated record header"));
        }
        let word = buf.get_u16_le();
        let tag = word & 0xf;
        let len = (word >> 4) as usize;
        if buf.len() < len {
            return Err(FsError::BadFormat("record overruns metadata region"));
        }
        let (mut payload, rest) = buf.split_at(len);
        *buf = rest;

        let rec = match tag {
            REC_INODE => {
                if len != 32 {
                    return Err(FsError::BadFormat("bad inode record length"));
                }
                Record::Inode {
                    ino: payload.get_u32_le(),
                    mode: payload.get_u32_le(),
                    uid: payload.get_u32_le(),
                    gid: payload.get_u32_le(),
                    rdev: payload.get_u32_le(),
                    mtime: TimeSpec {
                        sec: payload.get_i64_le(),
                        nsec: payload.get_i32_le(),
                    },
                }
            }
            REC_TRUNC => {
                if len != 12 {
                    return Err(FsError::BadFormat("bad trunc record length"));
                }
                Record::Trunc {
                    ino: payload.get_u32_le(),
                    new_size: payload.get_i64_le(),
                }
            }
            REC_DELETE => {
                if len < 9 {
                    return Err(FsError::BadFormat("bad delete record length"));
                }
                let parent = payload.get_u32_le();
                let ino = payload.get_u32_le();
                let namelen = payload.get_u8() as usize;
                if len != 9 + namelen {
                    return Err(FsError::BadFormat("bad delete record length"));
                }
                Record::Delete {
                    parent,
                    ino,
                    name: payload[..namelen].to_vec(),
                }
            }
            REC_SYMLNK => {
                if len < 5 {
                    return Err(FsError::BadFormat("bad symlink record length"));
                }
                let ino = payload.get_u32_le();
                let target_len = payload.get_u8() as usize;
                if len != 5 + target_len {
                    return Err(FsError::BadFormat("bad symlink record length"));
                }
                Record::Symlink {
                    ino,
                    target: payload[..target_len].to_vec(),
                }
            }
            REC_RENAME => {
                if len < 14 {
                    return Err(FsError::BadFormat("bad rename record length"));
                }
                let ino = payload.get_u32_le();
                let parent1 = payload.get_u32_le();
                let parent2 = payload.get_u32_le();
                let n1 = payload.get_u8() as usize;
                let n2 = payload.get_u8() as usize;
                if len != 14 + n1 + n2 {
                    return Err(FsError::BadFormat("bad rename record length"));
                }
                Record::Rename {
                    ino,
                    parent1,
                    parent2,
                    name1: payload[..n1].to_vec(),
                    name2: payload[n1..n1 + n2].to_vec(),
                }
            }
            REC_DATA => {
                if len != 28 {
                    return Err(FsError::BadFormat("bad data record length"));
                }
                Record::Data {
                    ino: payload.get_u32_le(),
                    obj_offset: payload.get_u32_le(),
                    file_offset: payload.get_i64_le(),
                    size: payload.get_i64_le(),
                    len: payload.get_u32_le(),
                }
            }
            REC_CREATE => {
                if len < 9 {
                    return Err(FsError::BadFormat("bad create record length"));
                }
                let parent = payload.get_u32_le();
                let ino = payload.get_u32_le();
                let namelen = payload.get_u8() as usize;
                if len != 9 + namelen {
                    return Err(FsError::BadFormat("bad create record length"));
                }
                Record::Create {
                    parent,
                    ino,
                    name: payload[..namelen].to_vec(),
                }
            }
            REC_NULL => Record::Null,
            _ => return Err(FsError::BadFormat("unknown record type")),
        };
        Ok(rec)
    }
}
