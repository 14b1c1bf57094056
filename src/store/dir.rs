use std::fs::{self, File};
use std::io::{self, Write};
use std::os::unix::fs::FileExt;
use std::path::PathBuf;
use std::sync::Mutex;

use indexmap::IndexMap;

use super::ObjectStore;

/// Open handles kept at most; eviction closes the oldest.
const HANDLE_CACHE_LIMIT: usize = 50;

/// Object store backed by a local directory, one file per object key.
///
/// Ranged reads go through a bounded FIFO cache of open file handles, since
/// reopening an object file for every extent read would dominate small-read
/// cost. `PUT` writes a temporary file and renames it into place, so a key
/// never exposes a partially written object.
#[derive(Debug)]
pub struct DirStore {
    base: PathBuf,
    handles: Mutex<IndexMap<String, File>>,
}

impl DirStore {
    /// Open (creating if needed) the backing directory.
    pub fn new(base: impl Into<PathBuf>) -> io::Result<DirStore> {
        let base = base.into();
        fs::create_dir_all(&base)?;
        Ok(DirStore {
            base,
            handles: Mutex::new(IndexMap::new()),
        })
    }
}

impl ObjectStore for DirStore {
    fn put(&self, key: &str, parts: &[&[u8]]) -> io::Result<()> {
        let tmp = self.base.join(format!("{key}.tmp"));
        let mut file = File::create(&tmp)?;
        for part in parts {
            file.write_all(part)?;
        }
        file.sync_all()?;
        fs::rename(&tmp, self.base.join(key))
    }

    fn get(&self, key: &str, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut handles = self.handles.lock().unwrap();
        if !handles.contains_key(key) {
            while handles.len() >= HANDLE_CACHE_LIMIT {
                handles.shift_remove_index(0);
            }
            let file = File::open(self.base.join(key))?;
            handles.insert(key.to_string(), file);
        }
        let file = &handles[key];

        let mut read = 0;
        while read < buf.len() {
            let n = file.read_at(&mut buf[read..], offset + read as u64)?;
            if n == 0 {
                break;
            }
            read += n;
        }
        Ok(read)
    }

    fn list(&self, prefix: &str) -> io::Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base)? {
            let entry = entry?;
            if let Ok(name) = entry.file_name().into_string() {
                if name.starts_with(prefix) && !name.ends_with(".tmp") {
                    keys.push(name);
                }
            }
        }
        keys.sort_unstable();
        Ok(keys)
    }
}
