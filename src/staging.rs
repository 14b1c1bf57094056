//! Staging buffers for the object currently being assembled.
//!
//! Two contiguous regions accumulate between flushes: the meta buffer holds
//! concatenated log records, the data buffer holds file payload bytes that
//! those records reference. Sealing concatenates `[header, meta, data]`
//! into one immutable object; both tails reset to zero afterwards.

use bytes::BytesMut;
use indexmap::IndexSet;

use crate::inode::Ino;
use crate::record::Record;

#[derive(Debug)]
pub(crate) struct Staging {
    meta: BytesMut,
    data: BytesMut,
    meta_cap: usize,
    data_cap: usize,
    /// Inodes needing a persisted inode record at the next flush.
    dirty: IndexSet<Ino>,
}

impl Staging {
    pub(crate) fn new(meta_cap: usize, data_cap: usize) -> Staging {
        Staging {
            meta: BytesMut::with_capacity(meta_cap),
            data: BytesMut::with_capacity(data_cap),
            meta_cap,
            data_cap,
            dirty: IndexSet::new(),
        }
    }

    pub(crate) fn push_record(&mut self, rec: &Record) {
        rec.encode(&mut self.meta);
    }

    /// Append file payload bytes, returning their offset within the data
    /// buffer. That offset becomes the extent's offset within the sealed
    /// object's file-data region.
    pub(crate) fn push_data(&mut self, payload: &[u8]) -> u32 {
        let at = self.data.len() as u32;
        self.data.extend_from_slice(payload);
        at
    }

    pub(crate) fn mark_dirty(&mut self, ino: Ino) {
        self.dirty.insert(ino);
    }

    pub(crate) fn forget_dirty(&mut self, ino: Ino) {
        self.dirty.shift_remove(&ino);
    }

    /// Drain the dirty set in insertion order.
    pub(crate) fn take_dirty(&mut self) -> Vec<Ino> {
        self.dirty.drain(..).collect()
    }

    /// True once either buffer exceeds its cap; the cut policy flushes then.
    pub(crate) fn over_capacity(&self) -> bool {
        self.meta.len() > self.meta_cap || self.data.len() > self.data_cap
    }

    pub(crate) fn meta_used(&self) -> usize {
        self.meta.len()
    }

    pub(crate) fn data_used(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn meta(&self) -> &[u8] {
        &self.meta
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reset both tails after a successful flush.
    pub(crate) fn reset(&mut self) {
        self.meta.clear();
        self.data.clear();
    }
}
