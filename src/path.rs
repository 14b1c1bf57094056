//! POSIX path resolution against the inode table.
//!
//! Paths are split on `/` with empty components discarded, so leading,
//! trailing, and duplicate slashes are all tolerated.

use crate::error::{FsError, Result};
use crate::inode::{Ino, InodeTable, ROOT_INO};

pub(crate) fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

fn walk<'a>(table: &InodeTable, from: Ino, parts: impl Iterator<Item = &'a str>) -> Result<Ino> {
    let mut ino = from;
    for name in parts {
        let node = table.get(ino).ok_or(FsError::NotFound)?;
        let entries = node.entries().ok_or(FsError::NotADirectory)?;
        ino = *entries.get(name).ok_or(FsError::NotFound)?;
    }
    Ok(ino)
}

/// Resolve `path` to an inode number, starting from the root.
pub(crate) fn resolve(table: &InodeTable, path: &str) -> Result<Ino> {
    walk(table, ROOT_INO, components(path))
}

/// Resolve the parent directory of `path`, returning its inode number and
/// the leaf name. Fails with `InvalidArgument` for the root itself.
pub(crate) fn resolve_parent<'a>(table: &InodeTable, path: &'a str) -> Result<(Ino, &'a str)> {
    let mut parts: Vec<&str> = components(path).collect();
    let leaf = parts.pop().ok_or(FsError::InvalidArgument)?;
    let parent = walk(table, ROOT_INO, parts.into_iter())?;
    Ok((parent, leaf))
}
