use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::fs::Filesystem;
use crate::store::ObjectStore;

/// A builder that configures and mounts a filesystem.
///
/// ## Examples
///
/// Mount with default settings against an in-memory store:
///
/// ```
/// use std::sync::Arc;
/// use objfs::store::MemoryStore;
///
/// let store = Arc::new(MemoryStore::new());
/// let fs = objfs::Builder::new().mount(store).unwrap();
/// ```
///
/// Or vary the staging caps and key prefix:
///
/// ```
/// use std::sync::Arc;
/// use objfs::store::MemoryStore;
///
/// let fs = objfs::Builder::new()
///     .meta_capacity(16 * 1024)
///     .data_capacity(4 * 1024 * 1024)
///     .prefix("vol0")
///     .mount(Arc::new(MemoryStore::new()))
///     .unwrap();
/// ```
pub struct Builder {
    config: Config,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            config: Config::default(),
        }
    }

    /// Cap on buffered log-record bytes before a cut. Default: 64 KiB.
    pub fn meta_capacity(&mut self, bytes: usize) -> &mut Self {
        assert!(bytes > 0, "meta_capacity must be positive");
        self.config.meta_capacity = bytes;
        self
    }

    /// Cap on buffered file-data bytes before a cut. Default: 16 MiB.
    pub fn data_capacity(&mut self, bytes: usize) -> &mut Self {
        assert!(bytes > 0, "data_capacity must be positive");
        self.config.data_capacity = bytes;
        self
    }

    /// Key prefix for this volume's objects. Default: `"objfs"`.
    ///
    /// A store can carry several volumes under distinct prefixes, but each
    /// prefix must have a single writer.
    pub fn prefix(&mut self, value: impl Into<String>) -> &mut Self {
        self.config.prefix = value.into();
        self
    }

    /// Mount: list every object under the prefix, replay them in index
    /// order, and return the reconstructed filesystem.
    pub fn mount(&self, store: Arc<dyn ObjectStore>) -> Result<Filesystem> {
        Filesystem::mount(self.config.clone(), store)
    }
}
