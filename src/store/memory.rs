use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::ObjectStore;

/// In-memory object store.
///
/// Holds objects in a map guarded by a mutex, so it can be shared between a
/// filesystem and a test (or between two mounts of the same volume, for
/// remount scenarios) behind an `Arc`. Counts `GET` calls so tests can
/// assert that staging-buffer reads never touch the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    gets: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Number of `GET` calls served so far.
    pub fn get_count(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    /// The raw bytes of a stored object, if present.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// All keys currently stored, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryStore {
    fn put(&self, key: &str, parts: &[&[u8]]) -> io::Result<()> {
        let mut body = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
        for part in parts {
            body.extend_from_slice(part);
        }
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    fn get(&self, key: &str, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        let objects = self.objects.lock().unwrap();
        let body = objects
            .get(key)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no object {key}")))?;
        let offset = offset.min(body.len() as u64) as usize;
        let n = buf.len().min(body.len() - offset);
        buf[..n].copy_from_slice(&body[offset..offset + n]);
        Ok(n)
    }

    fn list(&self, prefix: &str) -> io::Result<Vec<String>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
