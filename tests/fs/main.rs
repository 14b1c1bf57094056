//! Filesystem integration tests, split by area.

use std::sync::Arc;

use objfs::store::MemoryStore;
use objfs::{Builder, Filesystem};

mod basic;
mod dirs;
mod durability;
mod links;

/// Mount a fresh filesystem over a new in-memory store.
pub fn mount_fresh() -> (Arc<MemoryStore>, Filesystem) {
    let store = Arc::new(MemoryStore::new());
    let fs = Builder::new().mount(store.clone()).unwrap();
    (store, fs)
}

/// Remount over the same store, replaying everything flushed so far.
pub fn remount(store: &Arc<MemoryStore>) -> Filesystem {
    Builder::new().mount(store.clone()).unwrap()
}
